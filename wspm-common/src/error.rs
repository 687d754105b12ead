//! Common error types for WSPM

use std::fmt;
use thiserror::Error;

/// Common result type for WSPM operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across WSPM crates
#[derive(Error, Debug)]
pub enum Error {
    /// Stored value is not well-formed JSON, or does not fit the plan shape
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    /// Stored value parsed, but its layout cannot be migrated
    #[error("Invalid stored payload: {0}")]
    InvalidPayload(String),

    /// Backing store rejected a write (quota, read-only, ...)
    #[error("Persistence write failed: {0}")]
    PersistenceWrite(String),

    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Non-fatal findings produced by plan edits.
///
/// Warnings are logged and handed back to the caller; they never abort an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// A per-service metric was addressed to a label that is not selected.
    /// The edit is dropped so that no orphaned map entry is created.
    MetricForUnselectedService { label: String },

    /// A service label outside the known service-type catalog was selected
    UnknownServiceType { label: String },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MetricForUnselectedService { label } => {
                write!(f, "metric ignored for unselected service '{}'", label)
            }
            ValidationWarning::UnknownServiceType { label } => {
                write!(f, "service '{}' is not in the service-type catalog", label)
            }
        }
    }
}
