//! Error types for audit operations.

use checker_core::CheckerError;
use thiserror::Error;

/// Errors that abort the size-audit phase.
///
/// Unsupported types and oversized values are never errors; only a failure
/// to reach the data ends up here.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Reading a batch or running an aggregate query failed
    #[error("Data access failed: {0}")]
    DataAccess(String),

    /// A batch does not line up with the schema
    #[error("Batch has {actual} columns but the schema has {expected}")]
    ColumnCountMismatch { expected: usize, actual: usize },

    /// The data source cannot answer aggregate queries
    #[error("Aggregate push-down is not supported for column '{0}'")]
    PushDownUnsupported(String),
}

impl AuditError {
    /// Creates a new data access error.
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }
}

impl From<AuditError> for CheckerError {
    fn from(err: AuditError) -> Self {
        CheckerError::DataAccess(err.to_string())
    }
}
