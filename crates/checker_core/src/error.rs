//! Error types for the parquet checker.
//!
//! Only conditions that stop an audit live here: unreadable files, corrupt
//! metadata, failed data access, bad configuration. Unsupported types and
//! oversized values are findings and are reported through
//! [`AuditReport`](crate::AuditReport) instead.

use thiserror::Error;

/// Result type for checker operations.
pub type Result<T> = std::result::Result<T, CheckerError>;

/// Fatal errors that abort an audit run.
#[derive(Error, Debug)]
pub enum CheckerError {
    /// File missing or unreadable
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File footer could not be decoded
    #[error("Invalid file metadata: {0}")]
    InvalidMetadata(String),

    /// Reading column data or querying the data engine failed
    #[error("Data access failed: {0}")]
    DataAccess(String),

    /// Invalid audit configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl CheckerError {
    /// Creates a new invalid metadata error.
    pub fn invalid_metadata(message: impl Into<String>) -> Self {
        Self::InvalidMetadata(message.into())
    }

    /// Creates a new data access error.
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
