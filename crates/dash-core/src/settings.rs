use clap::builder::PossibleValuesParser;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{FilterSelection, MONTH_NAMES, RECOGNIZED_EVENT_TYPES, WEEKDAY_NAMES};

/// Dataset identifier the dashboard was built around.
pub const DEFAULT_DATASET: &str = "mkechinov/ecommerce-events-history-in-electronics-store";

/// Resource file inside the dataset.
pub const DEFAULT_RESOURCE: &str = "events.csv";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Interactive dashboard over e-commerce clickstream events
#[derive(Parser, Debug, Clone)]
#[command(
    name = "clickstream-dash",
    about = "Interactive dashboard over e-commerce clickstream events",
    version
)]
pub struct Settings {
    /// Explicit path to the event file (.csv or .jsonl); skips dataset lookup
    #[arg(long, env = "CLICKSTREAM_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Dataset identifier (owner/name) searched in the local dataset cache
    #[arg(long, default_value = DEFAULT_DATASET)]
    pub dataset: String,

    /// Resource file name inside the dataset
    #[arg(long, default_value = DEFAULT_RESOURCE)]
    pub resource: String,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report", "json"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Timezone used for hour/day/month bucketing ("auto" = system timezone)
    #[arg(long, default_value = "UTC")]
    pub timezone: String,

    /// Initial year filter
    #[arg(long)]
    pub year: Option<i32>,

    /// Initial month filter (English month name)
    #[arg(long, value_parser = PossibleValuesParser::new(MONTH_NAMES))]
    pub month: Option<String>,

    /// Initial weekday filter (English weekday name)
    #[arg(long, value_parser = PossibleValuesParser::new(WEEKDAY_NAMES))]
    pub day: Option<String>,

    /// Initial event types, comma separated; pass the flag without a value to select none
    #[arg(
        long,
        value_delimiter = ',',
        num_args = 0..,
        default_values = RECOGNIZED_EVENT_TYPES,
        value_parser = PossibleValuesParser::new(RECOGNIZED_EVENT_TYPES)
    )]
    pub event_types: Vec<String>,

    /// Number of brands shown in the top-brand rankings (1-100)
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub top_n: u32,

    /// Rows shown in the raw-data preview (1-10000)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub preview_rows: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.clickstream-dash/last_used.json`.
///
/// Filter values are deliberately not persisted: every session starts from
/// the CLI selection.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_rows: Option<u32>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".clickstream-dash").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, resolve `"auto"` values, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Build raw ArgMatches so we can query ValueSource.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!("could not clear {}: {}", config_path.display(), e);
            }
            return Self::resolve_auto_values(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins.  clap stores the arg id using the field name
        // (underscores), not the long-flag spelling.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "timezone") {
            if let Some(v) = last.timezone {
                settings.timezone = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "top_n") {
            if let Some(v) = last.top_n {
                settings.top_n = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "preview_rows") {
            if let Some(v) = last.preview_rows {
                settings.preview_rows = v;
            }
        }

        // Persist before resolving "auto" so the sentinel survives.
        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!("could not persist settings to {}: {}", config_path.display(), e);
        }

        Self::resolve_auto_values(settings)
    }

    /// The filter selection requested on the command line.
    pub fn initial_selection(&self) -> FilterSelection {
        FilterSelection::default()
            .with_year(self.year)
            .with_month(self.month.as_deref())
            .with_day(self.day.as_deref())
            .with_event_types(self.event_types.iter().cloned())
    }

    /// Resolve `"auto"` sentinel values and apply the `--debug` flag.
    fn resolve_auto_values(mut settings: Settings) -> Settings {
        settings.timezone = crate::time_utils::resolve_timezone_name(&settings.timezone);

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            timezone: Some(s.timezone.clone()),
            view: Some(s.view.clone()),
            top_n: Some(s.top_n),
            preview_rows: Some(s.preview_rows),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            theme: Some("dark".to_string()),
            timezone: Some("Asia/Jakarta".to_string()),
            view: Some("report".to_string()),
            top_n: Some(5),
            preview_rows: Some(250),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.theme.as_deref(), Some("dark"));
        assert_eq!(loaded.timezone.as_deref(), Some("Asia/Jakarta"));
        assert_eq!(loaded.view.as_deref(), Some("report"));
        assert_eq!(loaded.top_n, Some(5));
        assert_eq!(loaded.preview_rows, Some(250));
    }

    #[test]
    fn test_last_used_params_clear() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&path).expect("save");
        assert!(path.exists());

        LastUsedParams::clear_at(&path).expect("clear");
        assert!(!path.exists());
    }

    #[test]
    fn test_last_used_params_default_when_missing_or_corrupt() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        assert!(LastUsedParams::load_from(&path).theme.is_none());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).view.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["clickstream-dash"]);

        assert!(settings.data_file.is_none());
        assert_eq!(settings.dataset, DEFAULT_DATASET);
        assert_eq!(settings.resource, "events.csv");
        assert_eq!(settings.view, "dashboard");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.timezone, "UTC");
        assert!(settings.year.is_none());
        assert!(settings.month.is_none());
        assert!(settings.day.is_none());
        assert_eq!(settings.event_types, vec!["view", "cart", "purchase"]);
        assert_eq!(settings.top_n, 10);
        assert_eq!(settings.preview_rows, 100);
        assert_eq!(settings.log_level, "INFO");
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_filter_flags() {
        let settings = Settings::parse_from([
            "clickstream-dash",
            "--year",
            "2020",
            "--month",
            "October",
            "--day",
            "Friday",
            "--event-types",
            "cart,purchase",
        ]);
        let sel = settings.initial_selection();
        assert_eq!(sel.year, Some(2020));
        assert_eq!(sel.month_name.as_deref(), Some("October"));
        assert_eq!(sel.day_name.as_deref(), Some("Friday"));
        assert_eq!(sel.event_types.len(), 2);
        assert!(sel.event_types.contains("cart"));
        assert!(!sel.event_types.contains("view"));
    }

    #[test]
    fn test_settings_empty_event_types() {
        let settings = Settings::parse_from(["clickstream-dash", "--event-types"]);
        assert!(settings.initial_selection().event_types.is_empty());
    }

    #[test]
    fn test_settings_rejects_unknown_month() {
        let result = Settings::try_parse_from(["clickstream-dash", "--month", "Smarch"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_settings_rejects_zero_top_n() {
        let result = Settings::try_parse_from(["clickstream-dash", "--top-n", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_settings_to_last_used() {
        let settings = Settings::parse_from([
            "clickstream-dash",
            "--theme",
            "light",
            "--view",
            "json",
            "--top-n",
            "3",
        ]);
        let last = LastUsedParams::from(&settings);
        assert_eq!(last.theme.as_deref(), Some("light"));
        assert_eq!(last.view.as_deref(), Some("json"));
        assert_eq!(last.top_n, Some(3));
        assert_eq!(last.timezone.as_deref(), Some("UTC"));
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_theme() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            top_n: Some(7),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["clickstream-dash".into()], &config_path);
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.top_n, 7);
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["clickstream-dash".into(), "--theme".into(), "light".into()],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams::default().save_to(&config_path).expect("save");

        Settings::load_with_last_used_impl(
            vec!["clickstream-dash".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["clickstream-dash".into(), "--debug".into()],
            &config_path,
        );
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_load_with_last_used_persists_auto_sentinel() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let settings = Settings::load_with_last_used_impl(
            vec!["clickstream-dash".into(), "--timezone".into(), "auto".into()],
            &config_path,
        );
        assert_ne!(settings.timezone, "auto");

        let loaded = LastUsedParams::load_from(&config_path);
        assert_eq!(loaded.timezone.as_deref(), Some("auto"));
    }
}
