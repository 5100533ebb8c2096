//! Error types for the schic-rank library.

use thiserror::Error;

/// Main error type for the library.
#[derive(Error, Debug)]
pub enum RankError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Invalid cell id '{value}' at row {row} of {path}")]
    InvalidCellId {
        value: String,
        row: usize,
        path: String,
    },

    #[error("Invalid frequency '{value}' at row {row} of {path}")]
    InvalidFrequency {
        value: String,
        row: usize,
        path: String,
    },

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, RankError>;
