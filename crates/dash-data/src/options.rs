//! Selector options: the valid values for each filter control, derived from
//! the full (unfiltered) table.

use std::collections::BTreeSet;
use std::fmt;

use chrono::Datelike;
use dash_core::models::{EventTable, MONTH_NAMES, RECOGNIZED_EVENT_TYPES, WEEKDAY_NAMES};
use serde::Serialize;

/// One entry of a single-select control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Choice<T> {
    All,
    Value(T),
}

impl<T> Choice<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Choice::All => None,
            Choice::Value(v) => Some(v),
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => f.write_str("All"),
            Choice::Value(v) => v.fmt(f),
        }
    }
}

/// Options for every control.  Each single-select list starts with
/// [`Choice::All`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOptions {
    /// Distinct years, ascending.
    pub years: Vec<Choice<i32>>,
    /// Distinct month names, calendar order.
    pub months: Vec<Choice<String>>,
    /// Distinct weekday names, Monday first.
    pub days: Vec<Choice<String>>,
    /// Always the three recognised types, whatever the data contains.
    pub event_types: Vec<String>,
}

impl SelectorOptions {
    pub fn from_table(table: &EventTable) -> Self {
        let mut years = BTreeSet::new();
        let mut months = BTreeSet::new();
        let mut days = BTreeSet::new();

        for record in table.iter() {
            let Some(t) = record.event_time else {
                continue;
            };
            years.insert(t.year());
            months.insert(t.month0() as usize);
            if let Some(idx) = record.weekday_index() {
                days.insert(idx);
            }
        }

        Self {
            years: with_all(years.into_iter()),
            months: with_all(months.into_iter().map(|i| MONTH_NAMES[i].to_string())),
            days: with_all(days.into_iter().map(|i| WEEKDAY_NAMES[i].to_string())),
            event_types: RECOGNIZED_EVENT_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn with_all<T>(values: impl Iterator<Item = T>) -> Vec<Choice<T>> {
    std::iter::once(Choice::All)
        .chain(values.map(Choice::Value))
        .collect()
}
