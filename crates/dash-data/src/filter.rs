//! Filter engine: narrows the event table to the user's selection.
//!
//! Predicates are ANDed.  A predicate left at "All" is not applied, with the
//! exception of the event-type predicate which is always active.  Rows
//! without a parsable timestamp therefore survive as long as no time
//! predicate is selected.

use std::collections::BTreeSet;

use dash_core::models::{EventRecord, EventTable, FilterSelection};

// ── Predicate ─────────────────────────────────────────────────────────────────

/// One active filter condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Year(i32),
    Month(String),
    Day(String),
    EventTypes(BTreeSet<String>),
}

impl Predicate {
    pub fn matches(&self, record: &EventRecord) -> bool {
        match self {
            Predicate::Year(year) => record.year() == Some(*year),
            Predicate::Month(name) => record.month_name() == Some(name.as_str()),
            Predicate::Day(name) => record.day_name() == Some(name.as_str()),
            Predicate::EventTypes(types) => record
                .event_type
                .as_deref()
                .is_some_and(|t| types.contains(t)),
        }
    }

    /// Expand a selection into its active predicates.
    pub fn from_selection(selection: &FilterSelection) -> Vec<Predicate> {
        let mut predicates = Vec::with_capacity(4);
        if let Some(year) = selection.year {
            predicates.push(Predicate::Year(year));
        }
        if let Some(month) = &selection.month_name {
            predicates.push(Predicate::Month(month.clone()));
        }
        if let Some(day) = &selection.day_name {
            predicates.push(Predicate::Day(day.clone()));
        }
        predicates.push(Predicate::EventTypes(selection.event_types.clone()));
        predicates
    }
}

// ── FilteredView ──────────────────────────────────────────────────────────────

/// A borrowed subset of the source table, in source order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    rows: Vec<&'a EventRecord>,
}

impl<'a> FilteredView<'a> {
    /// Unfiltered view over every row of `table`.
    pub fn all(table: &'a EventTable) -> Self {
        Self {
            rows: table.iter().collect(),
        }
    }

    /// Keep only rows matching `predicate`.
    pub fn retain(&self, predicate: &Predicate) -> FilteredView<'a> {
        FilteredView {
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|r| predicate.matches(r))
                .collect(),
        }
    }

    /// Apply every predicate of `selection` to this view.
    pub fn refine(&self, selection: &FilterSelection) -> FilteredView<'a> {
        let predicates = Predicate::from_selection(selection);
        FilteredView {
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|r| predicates.iter().all(|p| p.matches(r)))
                .collect(),
        }
    }

    pub fn rows(&self) -> &[&'a EventRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EventRecord> + '_ {
        self.rows.iter().copied()
    }
}

// ── FilterEngine ──────────────────────────────────────────────────────────────

/// Stateless entry point for applying a selection to the source table.
pub struct FilterEngine;

impl FilterEngine {
    pub fn apply<'a>(table: &'a EventTable, selection: &FilterSelection) -> FilteredView<'a> {
        FilteredView::all(table).refine(selection)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ev(date: Option<(i32, u32, u32)>, kind: Option<&str>, user: &str) -> EventRecord {
        EventRecord {
            event_time: date.and_then(|(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d).and_then(|dt| dt.and_hms_opt(12, 0, 0))
            }),
            raw_time: String::new(),
            event_type: kind.map(str::to_string),
            user_id: Some(user.to_string()),
            brand: None,
            product_id: None,
            category_id: None,
            category_code: None,
            price: None,
            user_session: None,
        }
    }

    /// 2020-10-02 Friday, 2020-10-05 Monday, 2021-02-01 Monday, 2020-11-06 Friday.
    fn sample_table() -> EventTable {
        EventTable::new(vec![
            ev(Some((2020, 10, 2)), Some("view"), "u1"),
            ev(Some((2020, 10, 5)), Some("cart"), "u1"),
            ev(Some((2021, 2, 1)), Some("purchase"), "u2"),
            ev(Some((2020, 11, 6)), Some("view"), "u3"),
            ev(None, Some("view"), "u4"),
            ev(Some((2020, 10, 2)), None, "u5"),
            ev(Some((2020, 10, 2)), Some("remove_from_cart"), "u6"),
        ])
    }

    fn users(view: &FilteredView<'_>) -> Vec<String> {
        view.iter().filter_map(|r| r.user_id.clone()).collect()
    }

    #[test]
    fn test_default_selection_drops_only_unknown_types() {
        let table = sample_table();
        let view = FilterEngine::apply(&table, &FilterSelection::default());
        assert_eq!(users(&view), ["u1", "u1", "u2", "u3", "u4"]);
    }

    #[test]
    fn test_no_time_filter_keeps_unparsable_rows() {
        let table = sample_table();
        let view = FilterEngine::apply(&table, &FilterSelection::default());
        assert!(view.iter().any(|r| r.event_time.is_none()));
    }

    #[test]
    fn test_year_filter_excludes_unparsable_rows() {
        let table = sample_table();
        let sel = FilterSelection::default().with_year(Some(2020));
        let view = FilterEngine::apply(&table, &sel);
        assert_eq!(users(&view), ["u1", "u1", "u3"]);
    }

    #[test]
    fn test_month_and_day_filters() {
        let table = sample_table();
        let sel = FilterSelection::default()
            .with_month(Some("October"))
            .with_day(Some("Friday"));
        let view = FilterEngine::apply(&table, &sel);
        assert_eq!(users(&view), ["u1"]);
    }

    #[test]
    fn test_event_type_subset() {
        let table = sample_table();
        let sel = FilterSelection::default().with_event_types(["cart", "purchase"]);
        let view = FilterEngine::apply(&table, &sel);
        assert_eq!(users(&view), ["u1", "u2"]);
    }

    #[test]
    fn test_empty_event_types_yields_nothing() {
        let table = sample_table();
        let sel = FilterSelection::default().with_event_types(Vec::<String>::new());
        assert!(FilterEngine::apply(&table, &sel).is_empty());
    }

    #[test]
    fn test_filtered_rows_satisfy_every_predicate() {
        let table = sample_table();
        let sel = FilterSelection::default()
            .with_year(Some(2020))
            .with_event_types(["view"]);
        let view = FilterEngine::apply(&table, &sel);
        for p in Predicate::from_selection(&sel) {
            assert!(view.iter().all(|r| p.matches(r)), "{p:?} violated");
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let table = sample_table();
        let sel = FilterSelection::default().with_day(Some("Monday"));
        let once = FilterEngine::apply(&table, &sel);
        let twice = once.refine(&sel);
        assert_eq!(users(&once), users(&twice));
    }

    #[test]
    fn test_predicate_order_does_not_matter() {
        let table = sample_table();
        let all = FilteredView::all(&table);
        let year = Predicate::Year(2020);
        let types = Predicate::EventTypes(["view".to_string()].into_iter().collect());

        let a = all.retain(&year).retain(&types);
        let b = all.retain(&types).retain(&year);
        assert_eq!(users(&a), users(&b));
        assert_eq!(users(&a), ["u1", "u3"]);
    }

    #[test]
    fn test_source_order_preserved() {
        let table = sample_table();
        let sel = FilterSelection::default().with_event_types(["view"]);
        let view = FilterEngine::apply(&table, &sel);
        assert_eq!(users(&view), ["u1", "u3", "u4"]);
    }
}
