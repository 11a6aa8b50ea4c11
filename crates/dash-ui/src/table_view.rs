//! Raw-data preview table for the dashboard's second tab.
//!
//! Renders the leading rows of the current selection in a bordered
//! [`ratatui::widgets::Table`], one row per event, with vertical scrolling.

use dash_core::formatting;
use dash_core::models::EventRecord;
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::components::bar_chart::fit_width;
use crate::themes::Theme;

/// Column headers and widths, in display order.
const COLUMNS: [(&str, u16); 9] = [
    ("event_time", 23),
    ("event_type", 10),
    ("product_id", 10),
    ("category_id", 19),
    ("category_code", 28),
    ("brand", 14),
    ("price", 10),
    ("user_id", 19),
    ("user_session", 14),
];

/// One preview row, already formatted for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub cells: [String; 9],
}

impl PreviewRow {
    pub fn from_record(record: &EventRecord) -> Self {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        let time = match record.event_time {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => record.raw_time.clone(),
        };
        let cells = [
            time,
            opt(&record.event_type),
            opt(&record.product_id),
            opt(&record.category_id),
            opt(&record.category_code),
            opt(&record.brand),
            formatting::format_price(record.price),
            opt(&record.user_id),
            opt(&record.user_session),
        ];
        Self {
            cells: std::array::from_fn(|i| fit_width(&cells[i], COLUMNS[i].1 as usize)),
        }
    }
}

/// Render `records[offset..]` into `area`.
///
/// `total` is the size of the full selection, shown in the title so the user
/// knows how many rows the preview omits.
pub fn render_preview_table(
    frame: &mut Frame,
    area: Rect,
    records: &[EventRecord],
    offset: usize,
    total: u64,
    theme: &Theme,
) {
    let header = Row::new(
        COLUMNS
            .iter()
            .map(|(name, _)| Cell::from(*name).style(theme.table_header)),
    )
    .height(1);

    let offset = offset.min(records.len().saturating_sub(1));
    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .skip(offset)
        .map(|(i, record)| {
            let style = if i % 2 == 0 {
                theme.table_row
            } else {
                theme.table_row_alt
            };
            Row::new(PreviewRow::from_record(record).cells.map(Cell::from)).style(style)
        })
        .collect();

    let widths = COLUMNS.map(|(_, w)| Constraint::Length(w));
    let title = format!(
        " Raw Data: first {} of {} events ",
        formatting::format_count(records.len() as u64),
        formatting::format_count(total)
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(title),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Placeholder when the current selection matches no rows.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No events match the current filters", theme.warning)),
        Line::from(""),
        Line::from(Span::styled("Press 'r' to reset the filters.", theme.dim)),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Raw Data "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
