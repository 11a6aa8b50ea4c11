use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

// ── Calendar names ────────────────────────────────────────────────────────────

/// Canonical English month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Canonical English weekday names, Monday first.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// The three event types the dashboard recognises, in display order.
pub const RECOGNIZED_EVENT_TYPES: [&str; 3] = ["view", "cart", "purchase"];

// ── EventKind ─────────────────────────────────────────────────────────────────

/// Normalised event type used for display and the type distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "view")]
    View,
    #[serde(rename = "cart")]
    Cart,
    #[serde(rename = "purchase")]
    Purchase,
    /// Missing or unrecognised raw value.
    Unknown,
}

impl EventKind {
    /// All kinds in display order.
    pub const ALL: [EventKind; 4] = [
        EventKind::View,
        EventKind::Cart,
        EventKind::Purchase,
        EventKind::Unknown,
    ];

    /// Map a raw `event_type` cell onto a kind.  Matching is exact.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("view") => EventKind::View,
            Some("cart") => EventKind::Cart,
            Some("purchase") => EventKind::Purchase,
            _ => EventKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Cart => "cart",
            EventKind::Purchase => "purchase",
            EventKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EventRecord ───────────────────────────────────────────────────────────────

/// One user-item interaction after schema normalisation.
///
/// Every field except `raw_time` is optional: a missing or malformed cell is
/// represented as `None` rather than coerced to a default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Wall-clock time in the display timezone, `None` when unparsable.
    pub event_time: Option<NaiveDateTime>,
    /// The timestamp text exactly as it appeared in the source.
    pub raw_time: String,
    /// Raw event type, kept verbatim so the filter matches on the source value.
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub brand: Option<String>,
    pub product_id: Option<String>,
    pub category_id: Option<String>,
    pub category_code: Option<String>,
    pub price: Option<f64>,
    pub user_session: Option<String>,
}

impl EventRecord {
    /// Normalised event type; `Unknown` for missing or unrecognised values.
    pub fn kind(&self) -> EventKind {
        EventKind::from_raw(self.event_type.as_deref())
    }

    pub fn year(&self) -> Option<i32> {
        self.event_time.map(|t| t.year())
    }

    /// Canonical English month name, e.g. `"March"`.
    pub fn month_name(&self) -> Option<&'static str> {
        self.event_time.map(|t| MONTH_NAMES[t.month0() as usize])
    }

    /// Canonical English weekday name, e.g. `"Monday"`.
    pub fn day_name(&self) -> Option<&'static str> {
        self.event_time
            .map(|t| WEEKDAY_NAMES[t.weekday().num_days_from_monday() as usize])
    }

    /// Index into [`WEEKDAY_NAMES`] (Monday = 0).
    pub fn weekday_index(&self) -> Option<usize> {
        self.event_time
            .map(|t| t.weekday().num_days_from_monday() as usize)
    }

    pub fn hour(&self) -> Option<u32> {
        self.event_time.map(|t| t.hour())
    }

    /// Year-month period key, e.g. `"2024-03"`.
    pub fn year_month(&self) -> Option<String> {
        self.event_time.map(|t| t.format("%Y-%m").to_string())
    }
}

// ── EventTable ────────────────────────────────────────────────────────────────

/// The immutable source table, shared by reference after load.
#[derive(Debug, Clone)]
pub struct EventTable {
    records: Arc<[EventRecord]>,
}

impl Default for EventTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl EventTable {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }
}

impl FromIterator<EventRecord> for EventTable {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── FilterSelection ───────────────────────────────────────────────────────────

/// The user's chosen predicates.  `None` stands for "All".
///
/// An empty `event_types` set excludes every row; the default selects the
/// three recognised types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub year: Option<i32>,
    pub month_name: Option<String>,
    pub day_name: Option<String>,
    pub event_types: BTreeSet<String>,
}

impl Default for FilterSelection {
    fn default() -> Self {
        Self {
            year: None,
            month_name: None,
            day_name: None,
            event_types: RECOGNIZED_EVENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl FilterSelection {
    pub fn with_year(mut self, year: Option<i32>) -> Self {
        self.year = year;
        self
    }

    pub fn with_month(mut self, month: Option<&str>) -> Self {
        self.month_name = month.map(str::to_string);
        self
    }

    pub fn with_day(mut self, day: Option<&str>) -> Self {
        self.day_name = day.map(str::to_string);
        self
    }

    pub fn with_event_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = types.into_iter().map(Into::into).collect();
        self
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year = self
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "All".to_string());
        let types: Vec<&str> = RECOGNIZED_EVENT_TYPES
            .iter()
            .copied()
            .filter(|t| self.event_types.contains(*t))
            .chain(
                self.event_types
                    .iter()
                    .map(String::as_str)
                    .filter(|t| !RECOGNIZED_EVENT_TYPES.contains(t)),
            )
            .collect();
        write!(
            f,
            "Year: {} | Month: {} | Day: {} | Types: {}",
            year,
            self.month_name.as_deref().unwrap_or("All"),
            self.day_name.as_deref().unwrap_or("All"),
            if types.is_empty() {
                "(none)".to_string()
            } else {
                types.join(", ")
            }
        )
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
