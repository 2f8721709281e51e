//! Error types for the data module.

use thiserror::Error;

use stackwire_core::{CoreError, Retryable};

/// Result type alias for data operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors that can occur while talking to the data API or reading its results.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed cell in row {row}, column {column}: {reason}")]
    MalformedCell {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("Row {row} has {actual} cells but the result set has {expected} columns")]
    RowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Column {column} appears more than once in the result set; alias it to a unique name")]
    DuplicateColumn { column: String },

    #[error("Data API error: {message}")]
    DataApi { message: String, transient: bool },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DataError {
    pub fn data_api(msg: impl Into<String>) -> Self {
        DataError::DataApi {
            message: msg.into(),
            transient: false,
        }
    }

    /// Data API error worth retrying (throttling, cluster resuming, network).
    pub fn transient(msg: impl Into<String>) -> Self {
        DataError::DataApi {
            message: msg.into(),
            transient: true,
        }
    }
}

impl Retryable for DataError {
    fn is_retryable(&self) -> bool {
        match self {
            DataError::DataApi { transient, .. } => *transient,
            DataError::Core(e) => e.is_retryable(),
            _ => false,
        }
    }
}
