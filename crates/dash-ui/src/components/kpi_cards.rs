use crate::themes::Theme;
use dash_core::formatting::{format_count, format_number, format_ratio_percent};
use dash_data::aggregator::KpiSummary;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// A single headline metric.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiCard {
    pub label: &'static str,
    pub value: String,
}

impl KpiCard {
    /// The five dashboard KPIs in display order.
    pub fn from_summary(kpis: &KpiSummary) -> Vec<KpiCard> {
        vec![
            KpiCard {
                label: "Total Users",
                value: format_count(kpis.distinct_users),
            },
            KpiCard {
                label: "Total Events",
                value: format_count(kpis.event_count),
            },
            KpiCard {
                label: "Avg Events/User",
                value: format_number(kpis.avg_events_per_user, 2),
            },
            KpiCard {
                label: "Cart % of Events",
                value: format_ratio_percent(kpis.cart_ratio, 1),
            },
            KpiCard {
                label: "Purchase % of Events",
                value: format_ratio_percent(kpis.purchase_ratio, 1),
            },
        ]
    }

    /// Single-line form used in the scrolling dashboard body.
    pub fn to_span_pair<'a>(&self, theme: &'a Theme) -> [Span<'a>; 2] {
        [
            Span::styled(format!("{}: ", self.label), theme.kpi_label),
            Span::styled(self.value.clone(), theme.kpi_value),
        ]
    }
}

/// One line with every card, separated by dimmed bars.
pub fn kpi_line<'a>(cards: &[KpiCard], theme: &'a Theme) -> Line<'a> {
    let mut spans = Vec::with_capacity(cards.len() * 3);
    for (idx, card) in cards.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  │  ", theme.separator));
        }
        spans.extend(card.to_span_pair(theme));
    }
    Line::from(spans)
}

/// Render the cards as a row of equal-width bordered boxes.
pub fn render_kpi_row(frame: &mut Frame, area: Rect, cards: &[KpiCard], theme: &Theme) {
    if cards.is_empty() {
        return;
    }
    let constraints: Vec<Constraint> = cards
        .iter()
        .map(|_| Constraint::Ratio(1, cards.len() as u32))
        .collect();
    let columns = Layout::horizontal(constraints).split(area);

    for (card, column) in cards.iter().zip(columns.iter()) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.kpi_border)
            .title(Span::styled(card.label, theme.kpi_label));
        let body = Paragraph::new(Line::from(Span::styled(card.value.clone(), theme.kpi_value)))
            .block(block)
            .centered();
        frame.render_widget(body, *column);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
