//! Error types for the core module.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while loading settings or driving remote calls.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Settings file {path} is malformed: {message}")]
    MalformedSettings { path: PathBuf, message: String },

    #[error("{operation} timed out after {timeout:?}")]
    Timeout { operation: String, timeout: Duration },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Returns true if repeating the call might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Timeout { .. })
    }
}
