//! Error types for stack operations.

use thiserror::Error;

use stackwire_core::{CoreError, Retryable};

/// Result type alias for stack operations.
pub type StackResult<T> = Result<T, StackError>;

/// Errors that can occur while naming, provisioning or reading stacks.
#[derive(Error, Debug)]
pub enum StackError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid stack role: {0} (expected one of: main, logic)")]
    InvalidRole(String),

    #[error("Stack not found: {0}")]
    StackNotFound(String),

    #[error("Stack name {name} matches {count} deployed stacks")]
    AmbiguousStack { name: String, count: usize },

    #[error("Output {key} is declared by both {first_stack} and {second_stack}")]
    DuplicateOutputKey {
        key: String,
        first_stack: String,
        second_stack: String,
    },

    #[error("Provisioning API error: {message}")]
    ProvisioningApi { message: String, transient: bool },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StackError {
    /// Create a non-transient provisioning API error.
    pub fn provisioning(msg: impl Into<String>) -> Self {
        StackError::ProvisioningApi {
            message: msg.into(),
            transient: false,
        }
    }

    /// Create a provisioning API error worth retrying (throttling, network).
    pub fn transient(msg: impl Into<String>) -> Self {
        StackError::ProvisioningApi {
            message: msg.into(),
            transient: true,
        }
    }
}

impl Retryable for StackError {
    fn is_retryable(&self) -> bool {
        match self {
            StackError::ProvisioningApi { transient, .. } => *transient,
            StackError::Core(e) => e.is_retryable(),
            _ => false,
        }
    }
}
