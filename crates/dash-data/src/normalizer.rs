//! Schema normalisation: untyped [`RawEvent`] rows to typed [`EventRecord`]s.

use dash_core::models::{EventRecord, EventTable};
use dash_core::time_utils::TimezoneHandler;
use tracing::{debug, warn};

use crate::reader::RawEvent;

/// Result of normalising a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    pub table: EventTable,
    /// Rows whose `event_time` was missing or could not be parsed.
    pub unparsable_times: usize,
}

/// Converts raw rows into the typed schema, parsing timestamps into the
/// display timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaNormalizer {
    tz: TimezoneHandler,
}

impl SchemaNormalizer {
    pub fn new(tz: TimezoneHandler) -> Self {
        Self { tz }
    }

    /// Normalise every row.  Rows are never dropped: an unparsable timestamp
    /// becomes `None` and the row stays in the table.
    pub fn normalize(&self, rows: Vec<RawEvent>) -> NormalizedTable {
        let mut unparsable_times = 0usize;
        let records: Vec<EventRecord> = rows
            .into_iter()
            .map(|raw| {
                let record = self.normalize_row(raw);
                if record.event_time.is_none() {
                    unparsable_times += 1;
                }
                record
            })
            .collect();

        if unparsable_times > 0 {
            warn!(
                "{} of {} events have an empty or invalid event_time",
                unparsable_times,
                records.len()
            );
        }
        debug!("Normalised {} events", records.len());

        NormalizedTable {
            table: EventTable::new(records),
            unparsable_times,
        }
    }

    pub fn normalize_row(&self, raw: RawEvent) -> EventRecord {
        let raw_time = raw.event_time.unwrap_or_default();
        let event_time = self.tz.parse_local(&raw_time);

        EventRecord {
            event_time,
            raw_time,
            event_type: clean(raw.event_type),
            user_id: clean(raw.user_id),
            brand: clean(raw.brand),
            product_id: clean(raw.product_id),
            category_id: clean(raw.category_id),
            category_code: clean(raw.category_code),
            price: clean(raw.price).and_then(|p| p.parse::<f64>().ok()),
            user_session: clean(raw.user_session),
        }
    }
}

/// Trim a cell; blank cells become `None`.
fn clean(cell: Option<String>) -> Option<String> {
    cell.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}
