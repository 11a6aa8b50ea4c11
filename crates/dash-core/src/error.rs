use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the Clickstream Dashboard.
#[derive(Error, Debug)]
pub enum DashError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader failed on the header or the underlying stream.
    #[error("Failed to parse CSV: {0}")]
    CsvParse(#[from] csv::Error),

    /// The dataset header lacks a column the pipeline needs.
    #[error("Dataset is missing required column: {0}")]
    MissingColumn(String),

    /// No file for the requested dataset resource could be located.
    #[error("Dataset resource {resource} not found for {dataset}")]
    DatasetNotFound { dataset: String, resource: String },

    /// The resource file has an extension the loader cannot read.
    #[error("Unsupported dataset format: {0}")]
    UnsupportedFormat(PathBuf),

    /// A requested year, month or day does not occur in the loaded data.
    #[error("{control} {value} does not occur in the dataset")]
    FilterValueNotFound { control: String, value: String },

    /// A timezone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Convenience alias used throughout the dashboard crates.
pub type Result<T> = std::result::Result<T, DashError>;
