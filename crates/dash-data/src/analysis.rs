//! Top-level pipeline for the Clickstream Dashboard.
//!
//! [`load_dataset`] runs once at startup (read + normalise).
//! [`DashboardSnapshot::compute`] runs on every selection change (filter +
//! aggregate) and yields everything the presentation layer renders.

use std::path::Path;

use chrono::Utc;
use dash_core::models::{EventRecord, EventTable, FilterSelection};
use dash_core::time_utils::TimezoneHandler;
use dash_core::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregator::{
    BrandCount, DayCount, EventAggregator, HourCount, KindCount, KpiSummary, PeriodCount,
};
use crate::filter::{FilterEngine, FilteredView};
use crate::normalizer::SchemaNormalizer;
use crate::reader::load_events;

// ── Load ──────────────────────────────────────────────────────────────────────

/// Metadata produced alongside the loaded table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadMetadata {
    /// File the events were read from.
    pub source: String,
    /// ISO-8601 timestamp when the table was built.
    pub generated_at: String,
    /// Display timezone used for every calendar bucket.
    pub timezone: String,
    pub rows_read: usize,
    /// Records the reader could not decode at all.
    pub rows_skipped: usize,
    /// Rows kept in the table.
    pub rows_loaded: usize,
    /// Loaded rows with an empty or invalid `event_time`.
    pub unparsable_times: usize,
    /// Wall-clock seconds spent reading the file.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent normalising rows.
    pub normalize_time_seconds: f64,
}

/// The immutable source table plus its load metadata.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub table: EventTable,
    pub metadata: LoadMetadata,
}

/// Read `path` and normalise it into an [`EventTable`].
///
/// Fails on a missing file, an unsupported format or a missing required
/// column; individual bad records are skipped instead.
pub fn load_dataset(path: &Path, tz: &TimezoneHandler) -> Result<LoadedDataset> {
    // ── Step 1: Read ──────────────────────────────────────────────────────────
    let load_start = std::time::Instant::now();
    let loaded = load_events(path)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Normalise ─────────────────────────────────────────────────────
    let normalize_start = std::time::Instant::now();
    let rows_read = loaded.rows_read;
    let rows_skipped = loaded.rows_skipped;
    let normalized = SchemaNormalizer::new(*tz).normalize(loaded.rows);
    let normalize_time = normalize_start.elapsed().as_secs_f64();

    info!(
        "Loaded {} events from {} in {:.2}s",
        normalized.table.len(),
        path.display(),
        load_time + normalize_time
    );

    let metadata = LoadMetadata {
        source: path.display().to_string(),
        generated_at: Utc::now().to_rfc3339(),
        timezone: tz.display_tz().name().to_string(),
        rows_read,
        rows_skipped,
        rows_loaded: normalized.table.len(),
        unparsable_times: normalized.unparsable_times,
        load_time_seconds: load_time,
        normalize_time_seconds: normalize_time,
    };

    Ok(LoadedDataset {
        table: normalized.table,
        metadata,
    })
}

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Knobs for [`DashboardSnapshot::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// Length of each brand ranking.
    pub top_n: usize,
    /// Rows kept for the raw-data preview.
    pub preview_rows: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            preview_rows: 100,
        }
    }
}

/// Every aggregate for one selection.  Recomputed from the source table on
/// each change, never updated incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub selection: FilterSelection,
    pub kpis: KpiSummary,
    pub event_types: Vec<KindCount>,
    pub top_brands_by_event: Vec<BrandCount>,
    pub top_brands_by_purchase: Vec<BrandCount>,
    pub hourly: Vec<HourCount>,
    pub daily: Vec<DayCount>,
    pub monthly: Vec<PeriodCount>,
    /// Rows in the selection without a usable timestamp.
    pub unparsable_times: u64,
    /// Weekdays with zero events in the selection.
    pub empty_weekdays: Vec<String>,
    /// Leading rows of the selection, source order.
    pub preview: Vec<EventRecord>,
}

impl DashboardSnapshot {
    /// Filter `table` by `selection` and aggregate the result.
    pub fn compute(table: &EventTable, selection: &FilterSelection, config: SnapshotConfig) -> Self {
        let view = FilterEngine::apply(table, selection);
        Self::from_view(&view, selection, config)
    }

    pub fn from_view(view: &FilteredView<'_>, selection: &FilterSelection, config: SnapshotConfig) -> Self {
        let daily = EventAggregator::daily_distribution(view);
        let empty_weekdays = daily
            .iter()
            .filter(|d| d.count == 0)
            .map(|d| d.day.clone())
            .collect();

        Self {
            selection: selection.clone(),
            kpis: EventAggregator::kpis(view),
            event_types: EventAggregator::event_type_distribution(view),
            top_brands_by_event: EventAggregator::top_brands_by_event(view, config.top_n),
            top_brands_by_purchase: EventAggregator::top_brands_by_purchase(view, config.top_n),
            hourly: EventAggregator::hourly_distribution(view),
            daily,
            monthly: EventAggregator::monthly_distribution(view),
            unparsable_times: EventAggregator::unparsable_time_count(view),
            empty_weekdays,
            preview: view.iter().take(config.preview_rows).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kpis.event_count == 0
    }

    /// Human-readable data-quality notices for the current selection.
    pub fn notices(&self) -> Vec<String> {
        let mut notices = Vec::new();
        if self.unparsable_times > 0 {
            notices.push(format!(
                "{} events have an empty or invalid event_time and are excluded from time charts",
                self.unparsable_times
            ));
        }
        if !self.is_empty() && !self.empty_weekdays.is_empty() {
            notices.push(format!(
                "No events on: {}",
                self.empty_weekdays.join(", ")
            ));
        }
        notices
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::DashError;
    use tempfile::TempDir;

    const CSV: &str = "\
event_time,event_type,product_id,category_id,category_code,brand,price,user_id,user_session
2020-10-05 08:00:00 UTC,view,1,10,electronics.video.tv,samsung,300.00,A,s1
2020-10-05 09:30:00 UTC,cart,1,10,electronics.video.tv,samsung,300.00,A,s1
2020-10-06 21:15:00 UTC,purchase,2,11,computers.notebook,acer,700.00,B,s2
2020-11-02 10:00:00 UTC,view,3,12,,asus,50.00,C,s3
broken-time,view,4,13,,asus,10.00,D,s4
";

    fn write_csv(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("events.csv");
        std::fs::write(&path, CSV).unwrap();
        path
    }

    // ── load_dataset ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_dataset_metadata() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir);
        let loaded = load_dataset(&path, &TimezoneHandler::default()).unwrap();

        assert_eq!(loaded.table.len(), 5);
        assert_eq!(loaded.metadata.rows_read, 5);
        assert_eq!(loaded.metadata.rows_loaded, 5);
        assert_eq!(loaded.metadata.rows_skipped, 0);
        assert_eq!(loaded.metadata.unparsable_times, 1);
        assert_eq!(loaded.metadata.timezone, "UTC");
        assert!(!loaded.metadata.generated_at.is_empty());
        assert!(loaded.metadata.load_time_seconds >= 0.0);
    }

    #[test]
    fn test_load_dataset_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let err = load_dataset(&dir.path().join("none.csv"), &TimezoneHandler::default())
            .unwrap_err();
        assert!(matches!(err, DashError::FileRead { .. }));
    }

    // ── DashboardSnapshot ─────────────────────────────────────────────────────

    #[test]
    fn test_snapshot_default_selection() {
        let dir = TempDir::new().unwrap();
        let loaded = load_dataset(&write_csv(&dir), &TimezoneHandler::default()).unwrap();
        let snap = DashboardSnapshot::compute(
            &loaded.table,
            &FilterSelection::default(),
            SnapshotConfig::default(),
        );

        assert_eq!(snap.kpis.event_count, 5);
        assert_eq!(snap.kpis.distinct_users, 4);
        assert_eq!(snap.unparsable_times, 1);
        assert_eq!(snap.hourly.len(), 24);
        assert_eq!(snap.daily.len(), 7);
        assert_eq!(snap.monthly.len(), 2);
        assert_eq!(snap.top_brands_by_event[0].brand, "asus");
        assert_eq!(snap.top_brands_by_purchase.len(), 1);
        assert_eq!(snap.preview.len(), 5);
        assert_eq!(snap.notices().len(), 2);
    }

    #[test]
    fn test_snapshot_time_filter_drops_unparsable_rows() {
        let dir = TempDir::new().unwrap();
        let loaded = load_dataset(&write_csv(&dir), &TimezoneHandler::default()).unwrap();
        let sel = FilterSelection::default().with_month(Some("October"));
        let snap = DashboardSnapshot::compute(&loaded.table, &sel, SnapshotConfig::default());

        assert_eq!(snap.kpis.event_count, 3);
        assert_eq!(snap.unparsable_times, 0);
        assert_eq!(snap.selection, sel);
    }

    #[test]
    fn test_snapshot_empty_selection() {
        let dir = TempDir::new().unwrap();
        let loaded = load_dataset(&write_csv(&dir), &TimezoneHandler::default()).unwrap();
        let sel = FilterSelection::default().with_year(Some(1999));
        let snap = DashboardSnapshot::compute(&loaded.table, &sel, SnapshotConfig::default());

        assert!(snap.is_empty());
        assert_eq!(snap.kpis.avg_events_per_user, 0.0);
        assert!(snap.top_brands_by_event.is_empty());
        assert!(snap.hourly.iter().all(|h| h.count == 0));
        assert!(snap.notices().is_empty());
    }

    #[test]
    fn test_snapshot_respects_config() {
        let dir = TempDir::new().unwrap();
        let loaded = load_dataset(&write_csv(&dir), &TimezoneHandler::default()).unwrap();
        let config = SnapshotConfig {
            top_n: 1,
            preview_rows: 2,
        };
        let snap = DashboardSnapshot::compute(&loaded.table, &FilterSelection::default(), config);
        assert_eq!(snap.top_brands_by_event.len(), 1);
        assert_eq!(snap.preview.len(), 2);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let table = EventTable::default();
        let snap =
            DashboardSnapshot::compute(&table, &FilterSelection::default(), SnapshotConfig::default());
        let json = serde_json::to_value(&snap).unwrap();
        assert!(json.get("kpis").is_some());
        assert_eq!(json["hourly"].as_array().map(Vec::len), Some(24));
    }
}
