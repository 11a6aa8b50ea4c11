use crate::themes::Theme;
use dash_core::formatting::{format_count, format_ratio_percent};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Visual configuration shared by every horizontal bar chart.
#[derive(Debug, Clone, Copy)]
pub struct BarChartConfig {
    /// Columns reserved for the category label.
    pub label_width: usize,
    /// Columns of the bar itself (excluding label and value).
    pub bar_width: usize,
    pub filled_char: char,
    pub empty_char: char,
    /// Append the row's share of the total after the count.
    pub show_share: bool,
}

impl Default for BarChartConfig {
    fn default() -> Self {
        Self {
            label_width: 14,
            bar_width: 40,
            filled_char: '\u{2588}', // █  FULL BLOCK
            empty_char: '\u{2591}',  // ░  LIGHT SHADE
            show_share: false,
        }
    }
}

/// One bar: a label, a count and the style used for its fill.
#[derive(Debug, Clone)]
pub struct BarItem {
    pub label: String,
    pub count: u64,
    pub style: Style,
}

impl BarItem {
    pub fn new(label: impl Into<String>, count: u64, style: Style) -> Self {
        Self {
            label: label.into(),
            count,
            style,
        }
    }
}

// ── HorizontalBarChart ────────────────────────────────────────────────────────

/// A titled list of horizontal bars scaled to the largest count.
///
/// ```text
/// Top Brands by Event
///   samsung        ████████████████░░░░  1,204
/// ```
pub struct HorizontalBarChart<'a> {
    pub title: &'a str,
    pub items: Vec<BarItem>,
    pub theme: &'a Theme,
    pub config: BarChartConfig,
}

impl<'a> HorizontalBarChart<'a> {
    pub fn new(title: &'a str, items: Vec<BarItem>, theme: &'a Theme) -> Self {
        Self {
            title,
            items,
            theme,
            config: BarChartConfig::default(),
        }
    }

    pub fn with_config(mut self, config: BarChartConfig) -> Self {
        self.config = config;
        self
    }

    /// Title line followed by one line per item, or a "No data" line when
    /// there are no items.
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            self.title.to_string(),
            self.theme.chart_title,
        ))];

        if self.items.is_empty() {
            lines.push(Line::from(Span::styled("  No data", self.theme.dim)));
            return lines;
        }

        let max = self.items.iter().map(|i| i.count).max().unwrap_or(0);
        let total: u64 = self.items.iter().map(|i| i.count).sum();

        for item in &self.items {
            lines.push(self.bar_line(item, max, total));
        }
        lines
    }

    fn bar_line(&self, item: &BarItem, max: u64, total: u64) -> Line<'static> {
        let filled = if max > 0 {
            ((item.count as f64 / max as f64) * self.config.bar_width as f64).round() as usize
        } else {
            0
        };
        let filled = if item.count > 0 { filled.max(1) } else { 0 };
        let empty = self.config.bar_width.saturating_sub(filled);

        let mut value = format!(" {}", format_count(item.count));
        if self.config.show_share && total > 0 {
            value.push_str(&format!(
                " ({})",
                format_ratio_percent(item.count as f64 / total as f64, 1)
            ));
        }

        Line::from(vec![
            Span::styled(
                format!("  {} ", fit_width(&item.label, self.config.label_width)),
                self.theme.bar_label,
            ),
            Span::styled(repeat_char(self.config.filled_char, filled), item.style),
            Span::styled(repeat_char(self.config.empty_char, empty), self.theme.bar_empty),
            Span::styled(value, self.theme.value),
        ])
    }
}

fn repeat_char(c: char, n: usize) -> String {
    std::iter::repeat(c).take(n).collect()
}

/// Truncate or right-pad `s` to exactly `width` terminal columns.
///
/// Truncated labels end with `…`.  Wide characters are measured by display
/// width, not by byte or char count.
pub fn fit_width(s: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(s);
    if current <= width {
        return format!("{}{}", s, " ".repeat(width - current));
    }
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0usize;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn chart(theme: &Theme) -> HorizontalBarChart<'_> {
        HorizontalBarChart::new(
            "Top Brands",
            vec![
                BarItem::new("samsung", 100, theme.bar_brand_event),
                BarItem::new("apple", 50, theme.bar_brand_event),
                BarItem::new("none", 0, theme.bar_brand_event),
            ],
            theme,
        )
    }

    #[test]
    fn test_chart_line_count() {
        let theme = Theme::dark();
        let lines = chart(&theme).to_lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(text(&lines[0]), "Top Brands");
    }

    #[test]
    fn test_bars_scale_to_max() {
        let theme = Theme::dark();
        let config = BarChartConfig {
            bar_width: 20,
            ..BarChartConfig::default()
        };
        let lines = chart(&theme).with_config(config).to_lines();

        let filled = |line: &Line<'_>| line.spans[1].content.chars().count();
        assert_eq!(filled(&lines[1]), 20);
        assert_eq!(filled(&lines[2]), 10);
        assert_eq!(filled(&lines[3]), 0);
        for line in &lines[1..] {
            let bar = line.spans[1].content.chars().count() + line.spans[2].content.chars().count();
            assert_eq!(bar, 20, "bar must always span the configured width");
        }
    }

    #[test]
    fn test_small_nonzero_count_gets_a_cell() {
        let theme = Theme::dark();
        let lines = HorizontalBarChart::new(
            "t",
            vec![
                BarItem::new("big", 10_000, theme.bar_timeline),
                BarItem::new("tiny", 1, theme.bar_timeline),
            ],
            &theme,
        )
        .to_lines();
        assert_eq!(lines[2].spans[1].content.chars().count(), 1);
    }

    #[test]
    fn test_value_and_share() {
        let theme = Theme::dark();
        let config = BarChartConfig {
            show_share: true,
            ..BarChartConfig::default()
        };
        let lines = HorizontalBarChart::new(
            "Types",
            vec![
                BarItem::new("view", 3, theme.event_view),
                BarItem::new("Unknown", 1, theme.event_unknown),
            ],
            &theme,
        )
        .with_config(config)
        .to_lines();
        assert!(text(&lines[1]).ends_with(" 3 (75.0%)"), "got {}", text(&lines[1]));
        assert!(text(&lines[2]).ends_with(" 1 (25.0%)"));
    }

    #[test]
    fn test_empty_chart_shows_no_data() {
        let theme = Theme::dark();
        let lines = HorizontalBarChart::new("Empty", Vec::new(), &theme).to_lines();
        assert_eq!(lines.len(), 2);
        assert!(text(&lines[1]).contains("No data"));
    }

    #[test]
    fn test_fit_width_pads_and_truncates() {
        assert_eq!(fit_width("acer", 6), "acer  ");
        assert_eq!(fit_width("hewlett-packard", 8), "hewlett…");
        assert_eq!(UnicodeWidthStr::width(fit_width("日本語ブランド", 7).as_str()), 7);
        assert_eq!(fit_width("x", 0), "");
    }
}
