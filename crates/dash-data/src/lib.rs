//! Data layer for the Clickstream Dashboard.
//!
//! Responsible for locating and reading the event dataset, normalising it
//! into the typed schema, filtering it by the user's selection and computing
//! every aggregate the dashboard displays.

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod normalizer;
pub mod options;
pub mod reader;

pub use dash_core as core;
