//! Terminal UI layer for the Clickstream Dashboard.
//!
//! Provides themes, the header, KPI cards and bar-chart components, the
//! charts and raw-data tabs, the plain-text report and the interactive
//! application loop built on top of [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod report;
pub mod table_view;
pub mod themes;

pub use dash_core as core;
