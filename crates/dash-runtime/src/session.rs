//! Interactive dashboard state.
//!
//! [`DashboardSession`] owns the immutable source table and the user's
//! current selection.  Every selection change synchronously recomputes the
//! [`DashboardSnapshot`] from the full table, so the displayed aggregates
//! always match the displayed selection.

use std::collections::BTreeSet;

use dash_core::models::{EventTable, FilterSelection, RECOGNIZED_EVENT_TYPES};
use dash_core::{DashError, Result};
use dash_data::analysis::{DashboardSnapshot, SnapshotConfig};
use dash_data::options::SelectorOptions;
use tracing::{debug, warn};

use crate::controls::{Control, Selector};

pub struct DashboardSession {
    table: EventTable,
    options: SelectorOptions,
    cursors: Cursors,
    config: SnapshotConfig,
    snapshot: DashboardSnapshot,
    recomputations: u64,
}

impl DashboardSession {
    /// Build a session over `table` starting from `initial`.
    ///
    /// Year, month and day values absent from the data are ignored with a
    /// warning and the control stays at "All".
    pub fn new(table: EventTable, initial: &FilterSelection, config: SnapshotConfig) -> Self {
        let options = SelectorOptions::from_table(&table);
        let (cursors, rejected) = Cursors::seat(&options, initial);
        warn_rejected(&rejected);
        Self::assemble(table, options, cursors, config)
    }

    /// Strict variant of [`DashboardSession::new`] for one-shot output: a
    /// year, month or day absent from the data is an error.
    pub fn try_new(table: EventTable, initial: &FilterSelection, config: SnapshotConfig) -> Result<Self> {
        let options = SelectorOptions::from_table(&table);
        let (cursors, rejected) = Cursors::seat(&options, initial);
        if let Some((control, value)) = rejected.into_iter().next() {
            return Err(DashError::FilterValueNotFound {
                control: control.to_string(),
                value,
            });
        }
        Ok(Self::assemble(table, options, cursors, config))
    }

    fn assemble(
        table: EventTable,
        options: SelectorOptions,
        cursors: Cursors,
        config: SnapshotConfig,
    ) -> Self {
        let snapshot = compute(&table, &cursors.selection(), config);
        Self {
            table,
            options,
            cursors,
            config,
            snapshot,
            recomputations: 1,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    pub fn options(&self) -> &SelectorOptions {
        &self.options
    }

    pub fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> SnapshotConfig {
        self.config
    }

    /// Number of times the snapshot has been recomputed.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// The selection the current snapshot was computed for.
    pub fn selection(&self) -> &FilterSelection {
        &self.snapshot.selection
    }

    pub fn is_type_selected(&self, event_type: &str) -> bool {
        self.cursors.event_types.contains(event_type)
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Replace the whole selection.
    pub fn apply_selection(&mut self, selection: &FilterSelection) {
        let (cursors, rejected) = Cursors::seat(&self.options, selection);
        warn_rejected(&rejected);
        self.cursors = cursors;
        self.recompute();
    }

    /// Move a single-select control forward or backward.
    pub fn cycle(&mut self, control: Control, forward: bool) {
        match control {
            Control::Year => self.cursors.years.step(forward),
            Control::Month => self.cursors.months.step(forward),
            Control::Day => self.cursors.days.step(forward),
        }
        self.recompute();
    }

    /// Add or remove one of the recognised event types.
    pub fn toggle_event_type(&mut self, event_type: &str) {
        if !RECOGNIZED_EVENT_TYPES.contains(&event_type) {
            warn!("Cannot toggle unrecognised event type {:?}", event_type);
            return;
        }
        if !self.cursors.event_types.remove(event_type) {
            self.cursors.event_types.insert(event_type.to_string());
        }
        self.recompute();
    }

    /// Back to "All" everywhere with every recognised type selected.
    pub fn reset(&mut self) {
        self.apply_selection(&FilterSelection::default());
    }

    // ── Private ───────────────────────────────────────────────────────────

    fn recompute(&mut self) {
        self.snapshot = compute(&self.table, &self.cursors.selection(), self.config);
        self.recomputations += 1;
    }
}

/// Selector cursors positioned for one selection.
struct Cursors {
    years: Selector<i32>,
    months: Selector<String>,
    days: Selector<String>,
    event_types: BTreeSet<String>,
}

impl Cursors {
    /// Position fresh cursors over `options` at `selection`.  Values the
    /// data does not contain are returned alongside, their cursor left at
    /// "All".
    fn seat(options: &SelectorOptions, selection: &FilterSelection) -> (Self, Vec<(Control, String)>) {
        let mut years = Selector::new(options.years.clone());
        let mut months = Selector::new(options.months.clone());
        let mut days = Selector::new(options.days.clone());
        let mut rejected = Vec::new();

        if let Some(year) = selection.year {
            if !years.select(&year) {
                rejected.push((Control::Year, year.to_string()));
            }
        }
        if let Some(month) = &selection.month_name {
            if !months.select(month) {
                rejected.push((Control::Month, month.clone()));
            }
        }
        if let Some(day) = &selection.day_name {
            if !days.select(day) {
                rejected.push((Control::Day, day.clone()));
            }
        }

        let event_types = selection
            .event_types
            .iter()
            .filter(|t| {
                let known = RECOGNIZED_EVENT_TYPES.contains(&t.as_str());
                if !known {
                    warn!("Ignoring unrecognised event type {:?}", t);
                }
                known
            })
            .cloned()
            .collect();

        let cursors = Self {
            years,
            months,
            days,
            event_types,
        };
        (cursors, rejected)
    }

    fn selection(&self) -> FilterSelection {
        FilterSelection {
            year: self.years.value().copied(),
            month_name: self.months.value().cloned(),
            day_name: self.days.value().cloned(),
            event_types: self.event_types.clone(),
        }
    }
}

fn warn_rejected(rejected: &[(Control, String)]) {
    for (control, value) in rejected {
        warn!("{} {} not present in the data; showing all", control, value);
    }
}

fn compute(table: &EventTable, selection: &FilterSelection, config: SnapshotConfig) -> DashboardSnapshot {
    let start = std::time::Instant::now();
    let snapshot = DashboardSnapshot::compute(table, selection, config);
    debug!(
        "Recomputed dashboard for [{}]: {} events in {:.3}s",
        selection,
        snapshot.kpis.event_count,
        start.elapsed().as_secs_f64()
    );
    snapshot
}

// ── Tests ─────────────────────────────────────────────────────────────────────
