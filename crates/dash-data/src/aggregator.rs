//! Aggregations over a filtered view: KPIs, type proportions, brand rankings
//! and hour / weekday / month distributions.

use std::collections::{BTreeMap, HashMap, HashSet};

use dash_core::models::{EventKind, WEEKDAY_NAMES};
use serde::{Deserialize, Serialize};

use crate::filter::FilteredView;

// ── Result types ──────────────────────────────────────────────────────────────

/// Headline metrics for the current selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Distinct non-missing `user_id` values.
    pub distinct_users: u64,
    pub event_count: u64,
    /// `event_count / distinct_users`, `0.0` when there are no users.
    pub avg_events_per_user: f64,
    pub view_ratio: f64,
    pub cart_ratio: f64,
    pub purchase_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCount {
    pub kind: EventKind,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandCount {
    pub brand: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: String,
    pub count: u64,
}

/// Events in one `"YYYY-MM"` period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodCount {
    pub period: String,
    pub count: u64,
}

// ── EventAggregator ───────────────────────────────────────────────────────────

/// Stateless helper computing every dashboard aggregate from a view.
pub struct EventAggregator;

impl EventAggregator {
    pub fn event_count(view: &FilteredView<'_>) -> u64 {
        view.len() as u64
    }

    /// Distinct users; rows with a missing `user_id` are not counted.
    pub fn distinct_user_count(view: &FilteredView<'_>) -> u64 {
        view.iter()
            .filter_map(|r| r.user_id.as_deref())
            .collect::<HashSet<&str>>()
            .len() as u64
    }

    pub fn avg_events_per_user(view: &FilteredView<'_>) -> f64 {
        let users = Self::distinct_user_count(view);
        if users == 0 {
            return 0.0;
        }
        Self::event_count(view) as f64 / users as f64
    }

    /// Share of rows whose type is `kind`; `0.0` for an empty view.
    pub fn type_ratio(view: &FilteredView<'_>, kind: EventKind) -> f64 {
        if view.is_empty() {
            return 0.0;
        }
        let matching = view.iter().filter(|r| r.kind() == kind).count();
        matching as f64 / view.len() as f64
    }

    pub fn kpis(view: &FilteredView<'_>) -> KpiSummary {
        KpiSummary {
            distinct_users: Self::distinct_user_count(view),
            event_count: Self::event_count(view),
            avg_events_per_user: Self::avg_events_per_user(view),
            view_ratio: Self::type_ratio(view, EventKind::View),
            cart_ratio: Self::type_ratio(view, EventKind::Cart),
            purchase_ratio: Self::type_ratio(view, EventKind::Purchase),
        }
    }

    /// Count per kind in `view, cart, purchase, Unknown` order.  Kinds with no
    /// rows are omitted, so the counts always sum to the view size.
    pub fn event_type_distribution(view: &FilteredView<'_>) -> Vec<KindCount> {
        let mut counts: HashMap<EventKind, u64> = HashMap::new();
        for record in view.iter() {
            *counts.entry(record.kind()).or_insert(0) += 1;
        }

        EventKind::ALL
            .iter()
            .filter_map(|kind| {
                counts.get(kind).map(|&count| KindCount {
                    kind: *kind,
                    count,
                })
            })
            .collect()
    }

    /// The `n` brands with the most events.  Rows without a brand are
    /// ignored; ties break on brand name ascending.
    pub fn top_brands_by_event(view: &FilteredView<'_>, n: usize) -> Vec<BrandCount> {
        Self::rank_brands(view, n, |_| true)
    }

    /// The `n` brands with the most purchase events.
    pub fn top_brands_by_purchase(view: &FilteredView<'_>, n: usize) -> Vec<BrandCount> {
        Self::rank_brands(view, n, |kind| kind == EventKind::Purchase)
    }

    /// Events per hour of day, always 24 entries `0..=23`.
    pub fn hourly_distribution(view: &FilteredView<'_>) -> Vec<HourCount> {
        let mut counts = [0u64; 24];
        for hour in view.iter().filter_map(|r| r.hour()) {
            counts[hour as usize] += 1;
        }
        counts
            .iter()
            .enumerate()
            .map(|(hour, &count)| HourCount {
                hour: hour as u32,
                count,
            })
            .collect()
    }

    /// Events per weekday, always 7 entries Monday..Sunday.
    pub fn daily_distribution(view: &FilteredView<'_>) -> Vec<DayCount> {
        let mut counts = [0u64; 7];
        for idx in view.iter().filter_map(|r| r.weekday_index()) {
            counts[idx] += 1;
        }
        WEEKDAY_NAMES
            .iter()
            .zip(counts)
            .map(|(day, count)| DayCount {
                day: day.to_string(),
                count,
            })
            .collect()
    }

    /// Events per year-month, ascending.  Only periods with data appear.
    pub fn monthly_distribution(view: &FilteredView<'_>) -> Vec<PeriodCount> {
        let mut map: BTreeMap<String, u64> = BTreeMap::new();
        for period in view.iter().filter_map(|r| r.year_month()) {
            *map.entry(period).or_insert(0) += 1;
        }
        map.into_iter()
            .map(|(period, count)| PeriodCount { period, count })
            .collect()
    }

    /// Rows in the view whose timestamp could not be parsed.
    pub fn unparsable_time_count(view: &FilteredView<'_>) -> u64 {
        view.iter().filter(|r| r.event_time.is_none()).count() as u64
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn rank_brands(
        view: &FilteredView<'_>,
        n: usize,
        keep: impl Fn(EventKind) -> bool,
    ) -> Vec<BrandCount> {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for record in view.iter().filter(|r| keep(r.kind())) {
            if let Some(brand) = record.brand.as_deref() {
                *counts.entry(brand).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<BrandCount> = counts
            .into_iter()
            .map(|(brand, count)| BrandCount {
                brand: brand.to_string(),
                count,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.brand.cmp(&b.brand)));
        ranked.truncate(n);
        ranked
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
