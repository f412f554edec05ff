//! Error types for Aries
//!
//! Every fallible operation in the workspace returns this error.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Aries error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Arguments
    // ========================================================================
    #[error("Invalid arguments: expected {expected} positional arguments, got {actual}")]
    InvalidArity { expected: usize, actual: usize },

    // ========================================================================
    // Module loading
    // ========================================================================
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Module already registered: {0}")]
    DuplicateModule(String),

    // ========================================================================
    // Execution
    // ========================================================================
    #[error("Tunnel error: {0}")]
    Tunnel(String),

    /// Failure raised by a task handler, passed through untouched.
    #[error(transparent)]
    Task(anyhow::Error),

    // ========================================================================
    // AWS
    // ========================================================================
    #[error("AWS error: {service} - {message}")]
    Aws { service: String, message: String },

    // ========================================================================
    // Settings
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // External conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Wrap a handler failure without adding context
    pub fn task(err: impl Into<anyhow::Error>) -> Self {
        Error::Task(err.into())
    }

    /// AWS error helper
    pub fn aws(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Aws {
            service: service.into(),
            message: message.into(),
        }
    }

    /// The original handler error, if this failure came from a handler
    pub fn as_task_error(&self) -> Option<&anyhow::Error> {
        match self {
            Error::Task(err) => Some(err),
            _ => None,
        }
    }

    /// Errors caused by how the runner was invoked rather than by the task
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Error::InvalidArity { .. } | Error::ModuleNotFound(_) | Error::Config(_)
        )
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
