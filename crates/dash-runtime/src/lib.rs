//! Runtime layer for the Clickstream Dashboard.
//!
//! Holds the interactive session state: the loaded table, the selector
//! cursors and the snapshot recomputed on every selection change.

pub mod controls;
pub mod session;

pub use dash_core as core;
pub use dash_data as data;
