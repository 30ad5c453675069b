//! Data access for the size-audit phase.
//!
//! A [`DataAccess`] capability always yields row-aligned batches. Backends
//! that can answer column aggregates themselves also report
//! [`DataAccess::supports_aggregates`] and implement
//! [`DataAccess::max_value_size`], which lets the auditor skip the scan.

use crate::AuditError;
use arrow_array::RecordBatch;
use checker_core::Field;
use std::collections::VecDeque;

/// Access to a file's column data.
///
/// Batches are requested one at a time; a batch is folded and dropped before
/// the next one is requested, so an implementation only needs to hold one
/// batch in memory.
#[allow(async_fn_in_trait)]
pub trait DataAccess {
    /// Returns the next batch, or `None` once the data is exhausted.
    ///
    /// Every batch carries one column per top-level schema field, in schema
    /// order.
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, AuditError>;

    /// Returns true if [`max_value_size`](Self::max_value_size) is answered
    /// by the storage engine.
    fn supports_aggregates(&self) -> bool {
        false
    }

    /// Returns the largest value size in bytes of a non-container column.
    ///
    /// Nulls count as zero; a column with no values yields zero.
    async fn max_value_size(&mut self, field: &Field) -> Result<u64, AuditError> {
        Err(AuditError::PushDownUnsupported(field.name.clone()))
    }
}

/// Batches held in memory.
///
/// Useful for tests and for callers that already hold Arrow data.
#[derive(Debug, Default)]
pub struct InMemorySource {
    batches: VecDeque<RecordBatch>,
}

impl InMemorySource {
    /// Creates a source that yields `batches` in order.
    pub fn new(batches: Vec<RecordBatch>) -> Self {
        Self {
            batches: batches.into(),
        }
    }

    /// Returns the number of batches not yet consumed.
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }
}

impl DataAccess for InMemorySource {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, AuditError> {
        Ok(self.batches.pop_front())
    }
}
