//! Plain-text rendering of a [`DashboardSnapshot`] for `--view report`.
//!
//! Produces the same KPIs, charts and notices as the TUI, laid out as
//! fixed-width text tables suitable for piping or redirecting to a file.

use std::fmt::Write as _;

use dash_core::formatting::{format_count, format_hour_label, format_number, percentage};
use dash_data::analysis::{DashboardSnapshot, LoadMetadata};

use crate::components::kpi_cards::KpiCard;

const RULE_WIDTH: usize = 60;
const LABEL_WIDTH: usize = 24;

/// Render the snapshot and the load metadata as a text report.
pub fn render_report(snapshot: &DashboardSnapshot, metadata: &LoadMetadata) -> String {
    let mut out = String::new();
    let rule = "=".repeat(RULE_WIDTH);

    let _ = writeln!(out, "E-COMMERCE EVENT HISTORY REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Source:    {}", metadata.source);
    let _ = writeln!(out, "Timezone:  {}", metadata.timezone);
    let _ = writeln!(out, "Generated: {}", metadata.generated_at);
    let _ = writeln!(
        out,
        "Rows:      {} loaded, {} skipped",
        format_count(metadata.rows_loaded as u64),
        format_count(metadata.rows_skipped as u64)
    );
    let _ = writeln!(out, "Filters:   {}", snapshot.selection);
    out.push('\n');

    section(&mut out, "Key Metrics");
    for card in KpiCard::from_summary(&snapshot.kpis) {
        let _ = writeln!(out, "{:<LABEL_WIDTH$}{:>12}", card.label, card.value);
    }
    out.push('\n');

    if snapshot.is_empty() {
        let _ = writeln!(out, "No events match the current filters");
        out.push('\n');
    }
    let notices = snapshot.notices();
    for notice in &notices {
        let _ = writeln!(out, "! {notice}");
    }
    if !notices.is_empty() {
        out.push('\n');
    }

    let total = snapshot.kpis.event_count;
    let types: Vec<(String, u64)> = snapshot
        .event_types
        .iter()
        .map(|k| (k.kind.to_string(), k.count))
        .collect();
    count_table(&mut out, "Event Type Proportions", &types, Some(total));

    let by_event: Vec<(String, u64)> = snapshot
        .top_brands_by_event
        .iter()
        .map(|b| (b.brand.clone(), b.count))
        .collect();
    count_table(&mut out, "Top Brands by Event", &by_event, None);

    let by_purchase: Vec<(String, u64)> = snapshot
        .top_brands_by_purchase
        .iter()
        .map(|b| (b.brand.clone(), b.count))
        .collect();
    count_table(&mut out, "Top Brands by Purchase", &by_purchase, None);

    let hourly: Vec<(String, u64)> = if snapshot.is_empty() {
        Vec::new()
    } else {
        snapshot
            .hourly
            .iter()
            .map(|h| (format_hour_label(h.hour), h.count))
            .collect()
    };
    count_table(&mut out, "Events per Hour", &hourly, None);

    let daily: Vec<(String, u64)> = if snapshot.is_empty() {
        Vec::new()
    } else {
        snapshot.daily.iter().map(|d| (d.day.clone(), d.count)).collect()
    };
    count_table(&mut out, "Events per Day of Week", &daily, None);

    let monthly: Vec<(String, u64)> = snapshot
        .monthly
        .iter()
        .map(|p| (p.period.clone(), p.count))
        .collect();
    count_table(&mut out, "Events per Month", &monthly, None);

    let _ = writeln!(
        out,
        "Loaded in {}s, normalised in {}s",
        format_number(metadata.load_time_seconds, 2),
        format_number(metadata.normalize_time_seconds, 2)
    );
    out
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out, "{}", "-".repeat(title.len()));
}

/// Two-column table; with `share_of` a third column shows each row's percentage.
fn count_table(out: &mut String, title: &str, rows: &[(String, u64)], share_of: Option<u64>) {
    section(out, title);
    if rows.is_empty() {
        let _ = writeln!(out, "No data");
    }
    for (label, count) in rows {
        let _ = write!(out, "{:<LABEL_WIDTH$}{:>12}", label, format_count(*count));
        if let Some(total) = share_of {
            let _ = write!(out, "{:>9}%", format_number(percentage(*count as f64, total as f64, 1), 1));
        }
        out.push('\n');
    }
    out.push('\n');
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use dash_core::models::{EventRecord, EventTable, FilterSelection};
    use dash_data::analysis::SnapshotConfig;

    fn ev(day: u32, kind: &str, brand: &str) -> EventRecord {
        EventRecord {
            event_time: NaiveDate::from_ymd_opt(2020, 10, day).and_then(|d| d.and_hms_opt(10, 0, 0)),
            raw_time: String::new(),
            event_type: Some(kind.to_string()),
            user_id: Some(format!("u{day}")),
            brand: Some(brand.to_string()),
            product_id: None,
            category_id: None,
            category_code: None,
            price: None,
            user_session: None,
        }
    }

    fn metadata() -> LoadMetadata {
        LoadMetadata {
            source: "events.csv".to_string(),
            generated_at: "2020-11-01T00:00:00Z".to_string(),
            timezone: "UTC".to_string(),
            rows_read: 4,
            rows_skipped: 0,
            rows_loaded: 4,
            unparsable_times: 0,
            load_time_seconds: 0.5,
            normalize_time_seconds: 0.25,
        }
    }

    fn table() -> EventTable {
        EventTable::new(vec![
            ev(5, "view", "samsung"),
            ev(5, "view", "apple"),
            ev(6, "cart", "samsung"),
            ev(6, "purchase", "samsung"),
        ])
    }

    #[test]
    fn test_report_contains_kpis_and_charts() {
        let snap = DashboardSnapshot::compute(&table(), &FilterSelection::default(), SnapshotConfig::default());
        let report = render_report(&snap, &metadata());

        assert!(report.starts_with("E-COMMERCE EVENT HISTORY REPORT\n"));
        assert!(report.contains("Source:    events.csv"));
        assert!(report.lines().any(|l| l.starts_with("Total Events") && l.ends_with('4')));
        assert!(report.lines().any(|l| l.starts_with("Purchase % of Events") && l.ends_with("25.0%")));
        assert!(report.lines().any(|l| l.starts_with("view") && l.ends_with("50.0%")));
        assert!(report.lines().any(|l| l.starts_with("samsung") && l.ends_with('3')));
        assert!(report.contains("10:00"));
        assert!(report.contains("2020-10"));
        assert!(report.contains("! No events on:"));
        assert!(report.ends_with("Loaded in 0.50s, normalised in 0.25s\n"));
    }

    #[test]
    fn test_report_empty_selection() {
        let sel = FilterSelection::default().with_event_types(Vec::<String>::new());
        let snap = DashboardSnapshot::compute(&table(), &sel, SnapshotConfig::default());
        let report = render_report(&snap, &metadata());

        assert!(report.contains("No events match the current filters"));
        assert_eq!(report.lines().filter(|l| *l == "No data").count(), 6);
        assert!(!report.contains("! No events on:"));
    }
}
