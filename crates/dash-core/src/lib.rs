//! Core types shared by every Clickstream Dashboard crate.
//!
//! Holds the event data model, the filter selection tuple, the error type,
//! command-line settings, timestamp utilities and number formatting.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashError, Result};
