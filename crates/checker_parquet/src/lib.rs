//! Parquet integration for the checker.
//!
//! This crate reads a Parquet file's footer into a checker [`Schema`] and
//! exposes the file's data to the size auditor through two
//! [`DataAccess`](checker_audit::DataAccess) implementations:
//!
//! - [`ParquetBatchReader`]: bounded row-batch scan over the file
//! - [`DataFusionSource`]: column aggregates answered by DataFusion, with a
//!   row-batch scan behind it
//!
//! # Example
//!
//! ```no_run
//! use checker_core::AuditContext;
//! use checker_parquet::ParquetChecker;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let context = AuditContext::new().with_element_sizes(true);
//! let checker = ParquetChecker::new("data/events.parquet", context);
//!
//! let report = checker.run().await?;
//! for violation in &report.violations {
//!     println!("{}", violation);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`Schema`]: checker_core::Schema

use checker_audit::AuditError;
use checker_core::CheckerError;
use std::path::PathBuf;
use thiserror::Error;

mod checker;
mod converter;
mod loader;
mod pushdown;
mod reader;

pub use checker::ParquetChecker;
pub use converter::{arrow_type_tag, convert_arrow_field, size_category};
pub use loader::SchemaLoader;
pub use pushdown::{max_size_sql, DataFusionSource};
pub use reader::ParquetBatchReader;

/// Error types specific to Parquet operations.
#[derive(Error, Debug)]
pub enum ParquetSourceError {
    /// The file could not be opened
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Footer or page decoding failed
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Decoding a record batch failed
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow_schema::ArrowError),

    /// Registering the file or running an aggregate query failed
    #[error("DataFusion error: {0}")]
    DataFusion(#[from] datafusion::error::DataFusionError),

    /// An aggregate query returned something other than a single BIGINT
    #[error("Unexpected query result for column '{column}': {message}")]
    QueryResult { column: String, message: String },
}

impl ParquetSourceError {
    /// Creates a new query result error.
    pub fn query_result(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueryResult {
            column: column.into(),
            message: message.into(),
        }
    }
}

impl From<ParquetSourceError> for AuditError {
    fn from(err: ParquetSourceError) -> Self {
        AuditError::data_access(err.to_string())
    }
}

impl From<ParquetSourceError> for CheckerError {
    fn from(err: ParquetSourceError) -> Self {
        match err {
            ParquetSourceError::Open { path, source } => CheckerError::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {}", path.display(), source),
            )),
            ParquetSourceError::Parquet(e) => CheckerError::invalid_metadata(e.to_string()),
            other => CheckerError::data_access(other.to_string()),
        }
    }
}
