//! Dataset discovery and loading for the Clickstream Dashboard.
//!
//! Locates the event file (explicit path or the local dataset cache) and
//! reads it into untyped [`RawEvent`] rows.  Typing happens later, in
//! [`crate::normalizer`].

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use dash_core::{DashError, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Columns every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = ["event_time", "event_type", "user_id", "brand"];

// ── RawEvent ──────────────────────────────────────────────────────────────────

/// One row exactly as read from the source; every cell is optional text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawEvent {
    pub event_time: Option<String>,
    pub event_type: Option<String>,
    pub product_id: Option<String>,
    pub category_id: Option<String>,
    pub category_code: Option<String>,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub user_id: Option<String>,
    pub user_session: Option<String>,
}

impl RawEvent {
    /// Build a row from a JSON object, accepting strings, numbers and
    /// booleans for any column.
    fn from_json(obj: &serde_json::Map<String, Value>) -> Self {
        let cell = |key: &str| obj.get(key).and_then(json_cell);
        Self {
            event_time: cell("event_time"),
            event_type: cell("event_type"),
            product_id: cell("product_id"),
            category_id: cell("category_id"),
            category_code: cell("category_code"),
            brand: cell("brand"),
            price: cell("price"),
            user_id: cell("user_id"),
            user_session: cell("user_session"),
        }
    }
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Rows read from one file plus bookkeeping for the load metadata.
#[derive(Debug, Clone)]
pub struct LoadedEvents {
    pub source: PathBuf,
    pub rows: Vec<RawEvent>,
    /// Records encountered, including skipped ones.
    pub rows_read: usize,
    /// Records dropped because they could not be decoded at all.
    pub rows_skipped: usize,
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Root of the local dataset cache: `$KAGGLEHUB_CACHE`, else
/// `~/.cache/kagglehub`.
pub fn dataset_cache_root() -> PathBuf {
    if let Some(dir) = std::env::var_os("KAGGLEHUB_CACHE") {
        return PathBuf::from(dir);
    }
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache").join("kagglehub")
}

/// Search `cache_root/datasets/<dataset>/` for a file named `resource`.
///
/// When several versions are cached the highest `versions/<n>` wins.
pub fn find_dataset_file(cache_root: &Path, dataset: &str, resource: &str) -> Option<PathBuf> {
    let dataset_dir = cache_root.join("datasets").join(dataset);
    if !dataset_dir.exists() {
        debug!("dataset directory does not exist: {}", dataset_dir.display());
        return None;
    }

    let mut candidates: Vec<PathBuf> = walkdir::WalkDir::new(&dataset_dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == resource)
        .map(|entry| entry.into_path())
        .collect();

    candidates.sort_by_key(|p| (version_of(p), p.clone()));
    candidates.pop()
}

/// Numeric component following a `versions` directory, if any.
fn version_of(path: &Path) -> Option<u64> {
    let mut components = path.components().map(|c| c.as_os_str());
    while let Some(component) = components.next() {
        if component == "versions" {
            return components.next()?.to_str()?.parse().ok();
        }
    }
    None
}

/// Resolve the file to load: an explicit path wins, otherwise the cache is
/// searched.
pub fn resolve_dataset_path(
    data_file: Option<&Path>,
    cache_root: &Path,
    dataset: &str,
    resource: &str,
) -> Result<PathBuf> {
    if let Some(path) = data_file {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(DashError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file does not exist"),
        });
    }

    find_dataset_file(cache_root, dataset, resource).ok_or_else(|| DashError::DatasetNotFound {
        dataset: dataset.to_string(),
        resource: resource.to_string(),
    })
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Load every row of `path`, dispatching on the file extension.
pub fn load_events(path: &Path) -> Result<LoadedEvents> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let loaded = match ext.as_deref() {
        Some("csv") => load_csv(path)?,
        Some("jsonl") | Some("ndjson") => load_jsonl(path)?,
        _ => return Err(DashError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!(
        "Read {} rows ({} skipped) from {}",
        loaded.rows.len(),
        loaded.rows_skipped,
        path.display()
    );
    Ok(loaded)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| DashError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a headed CSV file.  Rows that fail to decode (wrong arity, invalid
/// UTF-8) are skipped with a warning.
pub fn load_csv(path: &Path) -> Result<LoadedEvents> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(open(path)?);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DashError::MissingColumn(column.to_string()));
        }
    }

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for result in reader.deserialize::<RawEvent>() {
        rows_read += 1;
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                rows_skipped += 1;
                warn!("Skipping malformed CSV record in {}: {}", path.display(), e);
            }
        }
    }

    Ok(LoadedEvents {
        source: path.to_path_buf(),
        rows,
        rows_read,
        rows_skipped,
    })
}

/// Read a JSON-lines file.  Blank lines are ignored; lines that are not JSON
/// objects are skipped with a warning.
pub fn load_jsonl(path: &Path) -> Result<LoadedEvents> {
    let reader = BufReader::new(open(path)?);

    let mut rows = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_skipped = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| DashError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        rows_read += 1;

        match serde_json::from_str::<Value>(trimmed) {
            Ok(Value::Object(obj)) => rows.push(RawEvent::from_json(&obj)),
            Ok(_) => {
                rows_skipped += 1;
                warn!("Skipping non-object JSON at {}:{}", path.display(), line_no + 1);
            }
            Err(e) => {
                rows_skipped += 1;
                warn!("Skipping invalid JSON at {}:{}: {}", path.display(), line_no + 1, e);
            }
        }
    }

    Ok(LoadedEvents {
        source: path.to_path_buf(),
        rows,
        rows_read,
        rows_skipped,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
