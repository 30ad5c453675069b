//! Row-batch scan over a Parquet file.

use crate::{loader::open_file, ParquetSourceError};
use arrow_array::RecordBatch;
use checker_audit::{AuditError, DataAccess};
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use std::path::Path;
use tracing::debug;

/// Reads a Parquet file one bounded batch at a time.
///
/// Owns the file handle; it is closed when the reader is dropped, on every
/// exit path.
pub struct ParquetBatchReader {
    reader: ParquetRecordBatchReader,
    batch_size: usize,
}

impl ParquetBatchReader {
    /// Opens a file for scanning with at most `batch_size` rows per batch.
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self, ParquetSourceError> {
        let path = path.as_ref();
        let batch_size = batch_size.max(1);
        debug!(
            "Opening {} for a row-batch scan ({} rows per batch)",
            path.display(),
            batch_size
        );

        let reader = ParquetRecordBatchReaderBuilder::try_new(open_file(path)?)?
            .with_batch_size(batch_size)
            .build()?;

        Ok(Self { reader, batch_size })
    }

    /// Returns the configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Reads the next batch.
    pub fn read_batch(&mut self) -> Result<Option<RecordBatch>, ParquetSourceError> {
        Ok(self.reader.next().transpose()?)
    }
}

impl DataAccess for ParquetBatchReader {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, AuditError> {
        Ok(self.read_batch()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow_array::{ArrayRef, Int32Array};
    use parquet::arrow::ArrowWriter;
    use std::fs::File;
    use std::sync::Arc;

    #[test]
    fn test_batches_are_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ints.parquet");

        let values: ArrayRef = Arc::new(Int32Array::from((0..10).collect::<Vec<_>>()));
        let batch = RecordBatch::try_from_iter(vec![("v", values)]).unwrap();
        let mut writer =
            ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let mut reader = ParquetBatchReader::open(&path, 4).unwrap();
        assert_eq!(reader.batch_size(), 4);

        let mut sizes = Vec::new();
        while let Some(batch) = reader.next_batch().unwrap() {
            sizes.push(batch.num_rows());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("one.parquet");

        let values: ArrayRef = Arc::new(Int32Array::from(vec![1]));
        let batch = RecordBatch::try_from_iter(vec![("v", values)]).unwrap();
        let mut writer =
            ArrowWriter::try_new(File::create(&path).unwrap(), batch.schema(), None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let reader = ParquetBatchReader::open(&path, 0).unwrap();
        assert_eq!(reader.batch_size(), 1);
    }
}
