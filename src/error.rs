//! Unified error handling for the tubelens crate
//!
//! Errors follow the run-level taxonomy: configuration mistakes fail a run
//! before any computation starts, while data defects are recovered locally
//! by the components and surface only as diagnostic counters. The variants
//! here are therefore the caller-facing failures: bad configuration, bad
//! input encoding, and infrastructure faults around the worker pool.

use std::io;
use thiserror::Error;

pub use crate::config::ConfigError;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration and validation errors
    Config,
    /// Serialization and input-encoding errors
    Serialization,
    /// File and stream I/O errors
    Io,
    /// Worker-dispatch failures
    Worker,
    /// Other/unknown errors
    Other,
}

/// Unified error type for the tubelens crate
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration validation or loading errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A worker task panicked or was cancelled mid-run
    #[error("Worker failure: {0}")]
    Worker(String),

    /// Generic error with context
    #[error("{context}")]
    Other {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a worker-failure error
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }

    /// Create a generic error with context
    pub fn other(context: impl Into<String>) -> Self {
        Self::Other {
            context: context.into(),
            source: None,
        }
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Config(_) => false,
            Self::Json(_) => false,
            Self::Io(_) => true,
            Self::Worker(_) => true,
            Self::Other { .. } => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Config,
            Self::Json(_) => ErrorCategory::Serialization,
            Self::Io(_) => ErrorCategory::Io,
            Self::Worker(_) => ErrorCategory::Worker,
            Self::Other { .. } => ErrorCategory::Other,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_category() {
        let err = Error::Config(ConfigError::ZeroParallelism);
        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_worker_error_recoverable() {
        let err = Error::worker("task cancelled");
        assert_eq!(err.category(), ErrorCategory::Worker);
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_config_error_conversion() {
        let config_err = ConfigError::UnknownWeightKey("dislikes".to_string());
        let unified: Error = config_err.into();
        assert!(matches!(unified, Error::Config(_)));
        assert!(unified.to_string().contains("dislikes"));
    }
}
