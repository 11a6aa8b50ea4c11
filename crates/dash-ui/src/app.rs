//! Main application state and TUI event loop for the Clickstream Dashboard.
//!
//! [`App`] owns the theme, the interactive [`DashboardSession`] and the
//! scroll state of both tabs.  Every filter key recomputes the session
//! snapshot before the next frame is drawn.

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dash_runtime::controls::Control;
use dash_runtime::session::DashboardSession;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    text::{Line, Text},
    widgets::{Paragraph, Tabs},
    Frame, Terminal,
};
use tracing::debug;

use crate::components::header::Header;
use crate::components::kpi_cards::{kpi_line, render_kpi_row, KpiCard};
use crate::dashboard_view;
use crate::table_view;
use crate::themes::Theme;

/// Lines moved by PageUp / PageDown.
const PAGE: usize = 10;

/// Below this width the KPI boxes collapse into a single line.
const NARROW_WIDTH: u16 = 110;

// ── Tab ───────────────────────────────────────────────────────────────────────

/// Which body the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    /// KPI-driven charts.
    Charts,
    /// Raw-data preview table.
    Data,
}

impl Tab {
    pub const TITLES: [&'static str; 2] = ["Dashboard", "Raw Data"];

    pub fn index(self) -> usize {
        match self {
            Tab::Charts => 0,
            Tab::Data => 1,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Tab::Charts => Tab::Data,
            Tab::Data => Tab::Charts,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub session: DashboardSession,
    /// Dataset label shown in the header.
    pub source: String,
    /// Display timezone shown in the header.
    pub timezone: String,
    pub tab: Tab,
    /// First visible line of the charts tab.
    pub chart_scroll: usize,
    /// First visible row of the raw-data table.
    pub table_offset: usize,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str, session: DashboardSession, source: String, timezone: String) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            session,
            source,
            timezone,
            tab: Tab::Charts,
            chart_scroll: 0,
            table_offset: 0,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the interactive dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout; the terminal is
    /// restored even when drawing fails.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
        let tick_rate = Duration::from_millis(250);
        loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                return Ok(());
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    /// Apply one key press to the application state.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let before = self.session.recomputations();

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,

            KeyCode::Char('y') => self.session.cycle(Control::Year, true),
            KeyCode::Char('Y') => self.session.cycle(Control::Year, false),
            KeyCode::Char('m') => self.session.cycle(Control::Month, true),
            KeyCode::Char('M') => self.session.cycle(Control::Month, false),
            KeyCode::Char('d') => self.session.cycle(Control::Day, true),
            KeyCode::Char('D') => self.session.cycle(Control::Day, false),
            KeyCode::Char('1') => self.session.toggle_event_type("view"),
            KeyCode::Char('2') => self.session.toggle_event_type("cart"),
            KeyCode::Char('3') => self.session.toggle_event_type("purchase"),
            KeyCode::Char('r') | KeyCode::Char('R') => self.session.reset(),

            KeyCode::Tab | KeyCode::BackTab => self.tab = self.tab.toggle(),

            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(PAGE as isize),
            KeyCode::PageUp => self.scroll_by(-(PAGE as isize)),
            KeyCode::Char('g') | KeyCode::Home => self.scroll_to_top(),
            _ => {}
        }

        if self.session.recomputations() != before {
            debug!("Selection changed: {}", self.session.selection());
            self.scroll_to_top();
        }
    }

    fn scroll_by(&mut self, delta: isize) {
        match self.tab {
            Tab::Charts => {
                let lines = dashboard_view::build_chart_lines(self.session.snapshot(), &self.theme);
                let max = lines.len().saturating_sub(1);
                self.chart_scroll = self.chart_scroll.saturating_add_signed(delta).min(max);
            }
            Tab::Data => {
                let max = self.session.snapshot().preview.len().saturating_sub(1);
                self.table_offset = self.table_offset.saturating_add_signed(delta).min(max);
            }
        }
    }

    fn scroll_to_top(&mut self) {
        self.chart_scroll = 0;
        self.table_offset = 0;
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&self, frame: &mut Frame) {
        let snapshot = self.session.snapshot();
        let [header_area, filter_area, help_area, tabs_area, kpi_area, body_area] =
            Layout::vertical([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .areas(frame.area());

        let header = Header::new(&self.source, &self.timezone, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        frame.render_widget(
            Paragraph::new(dashboard_view::filter_bar_line(&snapshot.selection, &self.theme)),
            filter_area,
        );
        frame.render_widget(
            Paragraph::new(dashboard_view::help_line(&self.theme)),
            help_area,
        );

        let tabs = Tabs::new(Tab::TITLES.iter().map(|t| Line::from(*t)))
            .select(self.tab.index())
            .style(self.theme.tab_style(false))
            .highlight_style(self.theme.tab_style(true));
        frame.render_widget(tabs, tabs_area);

        let cards = KpiCard::from_summary(&snapshot.kpis);
        if kpi_area.width < NARROW_WIDTH {
            frame.render_widget(Paragraph::new(kpi_line(&cards, &self.theme)), kpi_area);
        } else {
            render_kpi_row(frame, kpi_area, &cards, &self.theme);
        }

        match self.tab {
            Tab::Charts => {
                let scroll = u16::try_from(self.chart_scroll).unwrap_or(u16::MAX);
                dashboard_view::render_dashboard_view(frame, body_area, snapshot, scroll, &self.theme);
            }
            Tab::Data => {
                if snapshot.preview.is_empty() {
                    table_view::render_no_data(frame, body_area, &self.theme);
                } else {
                    table_view::render_preview_table(
                        frame,
                        body_area,
                        &snapshot.preview,
                        self.table_offset,
                        snapshot.kpis.event_count,
                        &self.theme,
                    );
                }
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
