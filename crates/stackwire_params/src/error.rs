//! Error types for the parameter module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for parameter operations.
pub type ParamResult<T> = Result<T, ParamError>;

/// Errors that can occur while handling the parameter file.
#[derive(Error, Debug)]
pub enum ParamError {
    #[error("Invalid parameter file {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Parameter not found: {0}")]
    KeyNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
