use dash_core::models::EventKind;
use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style used by the dashboard components.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub bold: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub warning: Style,
    pub error: Style,

    // ── Filter bar and tabs ──────────────────────────────────────────────────
    pub filter_active: Style,
    pub filter_inactive: Style,
    pub tab_active: Style,
    pub tab_inactive: Style,

    // ── KPI cards ────────────────────────────────────────────────────────────
    pub kpi_border: Style,
    pub kpi_label: Style,
    pub kpi_value: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_title: Style,
    pub bar_empty: Style,
    pub bar_label: Style,
    /// Fill for "top brands by event".
    pub bar_brand_event: Style,
    /// Fill for "top brands by purchase".
    pub bar_brand_purchase: Style,
    /// Fill for the hour / weekday / month timelines.
    pub bar_timeline: Style,

    // ── Event kinds ──────────────────────────────────────────────────────────
    pub event_view: Style,
    pub event_cart: Style,
    pub event_purchase: Style,
    pub event_unknown: Style,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Yellow),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            filter_active: Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
            filter_inactive: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),

            kpi_border: Style::default().fg(Color::DarkGray),
            kpi_label: Style::default().fg(Color::Gray),
            kpi_value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            chart_title: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            bar_empty: Style::default().fg(Color::DarkGray),
            bar_label: Style::default().fg(Color::Gray),
            bar_brand_event: Style::default().fg(Color::Blue),
            bar_brand_purchase: Style::default().fg(Color::Green),
            bar_timeline: Style::default().fg(Color::Cyan),

            event_view: Style::default().fg(Color::Blue),
            event_cart: Style::default().fg(Color::Green),
            event_purchase: Style::default().fg(Color::Red),
            event_unknown: Style::default().fg(Color::Gray),

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            bold: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            warning: Style::default().fg(Color::Magenta),
            error: Style::default().fg(Color::Red),

            filter_active: Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            filter_inactive: Style::default().fg(Color::DarkGray),
            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),

            kpi_border: Style::default().fg(Color::Gray),
            kpi_label: Style::default().fg(Color::DarkGray),
            kpi_value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            chart_title: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            bar_empty: Style::default().fg(Color::Gray),
            bar_label: Style::default().fg(Color::DarkGray),
            bar_brand_event: Style::default().fg(Color::Blue),
            bar_brand_purchase: Style::default().fg(Color::Green),
            bar_timeline: Style::default().fg(Color::Magenta),

            event_view: Style::default().fg(Color::Blue),
            event_cart: Style::default().fg(Color::Green),
            event_purchase: Style::default().fg(Color::Red),
            event_unknown: Style::default().fg(Color::DarkGray),

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
        }
    }

    /// Classic theme using only the basic 8-colour ANSI palette and no bold
    /// modifiers.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            bold: Style::default().fg(Color::White),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            warning: Style::default().fg(Color::Yellow),
            error: Style::default().fg(Color::Red),

            filter_active: Style::default().fg(Color::Yellow),
            filter_inactive: Style::default().fg(Color::Gray),
            tab_active: Style::default().fg(Color::Black).bg(Color::White),
            tab_inactive: Style::default().fg(Color::Gray),

            kpi_border: Style::default().fg(Color::DarkGray),
            kpi_label: Style::default().fg(Color::Gray),
            kpi_value: Style::default().fg(Color::White),

            chart_title: Style::default().fg(Color::Cyan),
            bar_empty: Style::default().fg(Color::DarkGray),
            bar_label: Style::default().fg(Color::White),
            bar_brand_event: Style::default().fg(Color::Blue),
            bar_brand_purchase: Style::default().fg(Color::Green),
            bar_timeline: Style::default().fg(Color::Cyan),

            event_view: Style::default().fg(Color::Blue),
            event_cart: Style::default().fg(Color::Green),
            event_purchase: Style::default().fg(Color::Red),
            event_unknown: Style::default().fg(Color::White),

            table_header: Style::default().fg(Color::Cyan),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour for an event kind: view blue, cart green, purchase red,
    /// unknown grey.
    pub fn event_kind_style(&self, kind: EventKind) -> Style {
        match kind {
            EventKind::View => self.event_view,
            EventKind::Cart => self.event_cart,
            EventKind::Purchase => self.event_purchase,
            EventKind::Unknown => self.event_unknown,
        }
    }

    pub fn filter_style(&self, active: bool) -> Style {
        if active {
            self.filter_active
        } else {
            self.filter_inactive
        }
    }

    pub fn tab_style(&self, active: bool) -> Style {
        if active {
            self.tab_active
        } else {
            self.tab_inactive
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
