//! Charts tab of the dashboard TUI.
//!
//! Renders the filter bar, data-quality notices and every chart of a
//! [`DashboardSnapshot`] as a single scrollable [`Paragraph`].

use dash_core::formatting::format_hour_label;
use dash_core::models::{FilterSelection, RECOGNIZED_EVENT_TYPES};
use dash_data::analysis::DashboardSnapshot;
use ratatui::{
    layout::Rect,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::components::bar_chart::{BarChartConfig, BarItem, HorizontalBarChart};
use crate::themes::Theme;

/// Filter bar: the current value of each control plus the event-type
/// checkboxes.
///
/// ```text
/// Year: 2020  Month: All  Day: All  Types: [x] view [ ] cart [x] purchase
/// ```
pub fn filter_bar_line<'a>(selection: &FilterSelection, theme: &'a Theme) -> Line<'a> {
    let year = selection
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "All".to_string());
    let month = selection.month_name.clone().unwrap_or_else(|| "All".to_string());
    let day = selection.day_name.clone().unwrap_or_else(|| "All".to_string());

    let mut spans = vec![
        Span::styled("Year: ", theme.label),
        Span::styled(year, theme.filter_style(selection.year.is_some())),
        Span::styled("  Month: ", theme.label),
        Span::styled(month, theme.filter_style(selection.month_name.is_some())),
        Span::styled("  Day: ", theme.label),
        Span::styled(day, theme.filter_style(selection.day_name.is_some())),
        Span::styled("  Types:", theme.label),
    ];
    for event_type in RECOGNIZED_EVENT_TYPES {
        let on = selection.event_types.contains(event_type);
        spans.push(Span::styled(
            format!(" [{}] {}", if on { 'x' } else { ' ' }, event_type),
            theme.filter_style(on),
        ));
    }
    Line::from(spans)
}

/// Key reference shown under the filter bar.
pub fn help_line(theme: &Theme) -> Line<'_> {
    Line::from(Span::styled(
        "y/Y year  m/M month  d/D day  1/2/3 view/cart/purchase  r reset  Tab switch  j/k scroll  q quit",
        theme.dim,
    ))
}

/// Build every line of the charts tab (extracted for testability).
pub fn build_chart_lines(snapshot: &DashboardSnapshot, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::with_capacity(96);

    // ── Notices ───────────────────────────────────────────────────────────────
    if snapshot.is_empty() {
        lines.push(Line::from(Span::styled(
            "No events match the current filters",
            theme.warning,
        )));
        lines.push(Line::from(""));
    }
    let notices = snapshot.notices();
    for notice in &notices {
        lines.push(Line::from(Span::styled(format!("! {}", notice), theme.warning)));
    }
    if !notices.is_empty() {
        lines.push(Line::from(""));
    }

    // ── Event type proportions ────────────────────────────────────────────────
    let type_items = snapshot
        .event_types
        .iter()
        .map(|k| BarItem::new(k.kind.as_str(), k.count, theme.event_kind_style(k.kind)))
        .collect();
    push_chart(
        &mut lines,
        HorizontalBarChart::new("Event Type Proportions", type_items, theme).with_config(
            BarChartConfig {
                show_share: true,
                ..BarChartConfig::default()
            },
        ),
    );

    // ── Brand rankings ────────────────────────────────────────────────────────
    let by_event = snapshot
        .top_brands_by_event
        .iter()
        .map(|b| BarItem::new(b.brand.clone(), b.count, theme.bar_brand_event))
        .collect();
    push_chart(&mut lines, HorizontalBarChart::new("Top Brands by Event", by_event, theme));

    let by_purchase = snapshot
        .top_brands_by_purchase
        .iter()
        .map(|b| BarItem::new(b.brand.clone(), b.count, theme.bar_brand_purchase))
        .collect();
    push_chart(&mut lines, HorizontalBarChart::new("Top Brands by Purchase", by_purchase, theme));

    // ── Time distributions ────────────────────────────────────────────────────
    let timeline = |label: String, count: u64| BarItem::new(label, count, theme.bar_timeline);
    let empty = snapshot.is_empty();

    let hourly = if empty {
        Vec::new()
    } else {
        snapshot
            .hourly
            .iter()
            .map(|h| timeline(format_hour_label(h.hour), h.count))
            .collect()
    };
    push_chart(&mut lines, HorizontalBarChart::new("Events per Hour", hourly, theme));

    let daily = if empty {
        Vec::new()
    } else {
        snapshot
            .daily
            .iter()
            .map(|d| timeline(d.day.clone(), d.count))
            .collect()
    };
    push_chart(&mut lines, HorizontalBarChart::new("Events per Day of Week", daily, theme));

    let monthly = snapshot
        .monthly
        .iter()
        .map(|p| timeline(p.period.clone(), p.count))
        .collect();
    push_chart(&mut lines, HorizontalBarChart::new("Events per Month", monthly, theme));

    lines
}

fn push_chart(lines: &mut Vec<Line<'static>>, chart: HorizontalBarChart<'_>) {
    lines.extend(chart.to_lines());
    lines.push(Line::from(""));
}

/// Render the charts tab into `area`, scrolled down by `scroll` lines.
pub fn render_dashboard_view(
    frame: &mut Frame,
    area: Rect,
    snapshot: &DashboardSnapshot,
    scroll: u16,
    theme: &Theme,
) {
    let lines = build_chart_lines(snapshot, theme);
    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(theme.separator),
        )
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────
