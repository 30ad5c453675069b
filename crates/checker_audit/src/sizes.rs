//! Element size auditing.
//!
//! Computes, per top-level column, the largest serialized value size in the
//! file. Two strategies share one contract:
//!
//! - **Row-batch scan**: fold every value of every batch into a running maximum.
//! - **Aggregate push-down**: ask the storage engine for each column's maximum.
//!
//! Both produce the same numbers for non-container columns. Container columns
//! are never sized; they are reported as unmeasured.

use crate::{AuditError, DataAccess};
use arrow_array::cast::AsArray;
use arrow_array::{Array, RecordBatch};
use checker_core::{
    AppliedStrategy, ColumnSize, Field, Schema, SizeCategory, SizeReport, SizeStrategy,
};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Running maximum value size of one column.
///
/// Starts at zero and never decreases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SizeAccumulator {
    max_bytes: u64,
}

impl SizeAccumulator {
    /// Creates an accumulator at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a batch-local maximum into the running maximum.
    pub fn fold(&mut self, bytes: u64) {
        self.max_bytes = self.max_bytes.max(bytes);
    }

    /// Returns the running maximum in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }
}

/// Batch count of a running scan.
///
/// The total is estimated from the footer row count and the batch size; it
/// is unknown when either is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    processed: usize,
    total: Option<usize>,
}

impl ScanProgress {
    /// Starts counting batches of at most `batch_size` rows out of `num_rows`.
    pub fn new(num_rows: u64, batch_size: Option<usize>) -> Self {
        let total = match batch_size {
            Some(size) if size > 0 && num_rows > 0 => {
                Some(num_rows.div_ceil(size as u64) as usize)
            }
            _ => None,
        };
        Self {
            processed: 0,
            total,
        }
    }

    /// Records one more folded batch.
    pub fn advance(&mut self) {
        self.processed += 1;
    }

    /// Returns the number of batches folded so far.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Returns the expected number of batches, if known.
    pub fn total(&self) -> Option<usize> {
        self.total
    }
}

impl fmt::Display for ScanProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total {
            // Readers may split differently than estimated
            Some(total) => write!(f, "batch {} / {}", self.processed, total.max(self.processed)),
            None => write!(f, "batch {}", self.processed),
        }
    }
}

/// Audits per-column maximum value sizes.
pub struct SizeAuditor {
    strategy: SizeStrategy,
    batch_size: Option<usize>,
}

impl SizeAuditor {
    /// Creates a size auditor with the requested strategy.
    pub fn new(strategy: SizeStrategy) -> Self {
        Self {
            strategy,
            batch_size: None,
        }
    }

    /// Sets the rows per batch the data source yields, for progress reporting.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Returns the requested strategy.
    pub fn strategy(&self) -> SizeStrategy {
        self.strategy
    }

    /// Audits a schema against a data source.
    ///
    /// Picks push-down or scan from the requested strategy and what `access`
    /// supports. Any data-access failure aborts the whole phase.
    pub async fn audit<A: DataAccess>(
        &self,
        schema: &Schema,
        access: &mut A,
    ) -> Result<SizeReport, AuditError> {
        self.audit_since(Instant::now(), schema, access).await
    }

    /// Like [`audit`](Self::audit), with the elapsed time measured from
    /// `start`, so opening the data source can be counted.
    pub async fn audit_since<A: DataAccess>(
        &self,
        start: Instant,
        schema: &Schema,
        access: &mut A,
    ) -> Result<SizeReport, AuditError> {
        let push_down = match self.strategy {
            SizeStrategy::Auto => access.supports_aggregates(),
            SizeStrategy::Scan => false,
            SizeStrategy::PushDown => {
                if !access.supports_aggregates() {
                    warn!("Data source cannot answer aggregate queries, falling back to a scan");
                }
                access.supports_aggregates()
            }
        };

        let mut report = if push_down {
            info!("Auditing element sizes with aggregate push-down");
            self.push_down(schema, access).await?
        } else {
            info!("Auditing element sizes with a row-batch scan");
            self.scan(schema, access)?
        };

        report.elapsed = start.elapsed();
        info!(
            "Size audit of {} column(s) finished in {:.2?}",
            report.columns.len(),
            report.elapsed
        );

        Ok(report)
    }

    /// Scans every batch and folds value sizes into per-column maxima.
    ///
    /// Batch `n + 1` is requested only after batch `n` has been folded and
    /// dropped.
    pub fn scan<A: DataAccess>(
        &self,
        schema: &Schema,
        access: &mut A,
    ) -> Result<SizeReport, AuditError> {
        let mut accumulators = vec![SizeAccumulator::new(); schema.len()];
        let mut progress = ScanProgress::new(schema.num_rows, self.batch_size);
        let mut rows_processed = 0u64;

        while let Some(batch) = access.next_batch()? {
            fold_batch(schema, &batch, &mut accumulators)?;
            progress.advance();
            rows_processed += batch.num_rows() as u64;
            info!("Processed {}", progress);
            debug!(
                "Batch had {} rows, {} rows so far",
                batch.num_rows(),
                rows_processed
            );
        }
        let batches_processed = progress.processed();

        let columns = schema
            .fields
            .iter()
            .zip(&accumulators)
            .map(|(field, acc)| column_result(field, acc.max_bytes()))
            .collect();

        Ok(SizeReport {
            columns,
            strategy: AppliedStrategy::Scan,
            batches_processed,
            rows_processed,
            elapsed: Duration::ZERO,
        })
    }

    /// Issues one aggregate query per measurable column.
    ///
    /// Container columns are left out of the query set.
    pub async fn push_down<A: DataAccess>(
        &self,
        schema: &Schema,
        access: &mut A,
    ) -> Result<SizeReport, AuditError> {
        let mut columns = Vec::with_capacity(schema.len());

        for field in &schema.fields {
            if !field.is_measurable() {
                columns.push(ColumnSize::unmeasured(&field.name));
                continue;
            }

            let mut acc = SizeAccumulator::new();
            acc.fold(access.max_value_size(field).await?);
            debug!("Column '{}' max value size: {} bytes", field.name, acc.max_bytes());
            columns.push(ColumnSize::measured(&field.name, acc.max_bytes()));
        }

        Ok(SizeReport {
            columns,
            strategy: AppliedStrategy::PushDown,
            batches_processed: 0,
            rows_processed: 0,
            elapsed: Duration::ZERO,
        })
    }
}

impl Default for SizeAuditor {
    fn default() -> Self {
        Self::new(SizeStrategy::Auto)
    }
}

fn column_result(field: &Field, max_bytes: u64) -> ColumnSize {
    if field.is_measurable() {
        ColumnSize::measured(&field.name, max_bytes)
    } else {
        ColumnSize::unmeasured(&field.name)
    }
}

/// Folds one batch into the per-column accumulators.
///
/// `accumulators` holds one entry per top-level field. Container columns are
/// skipped and keep their accumulator at zero.
pub fn fold_batch(
    schema: &Schema,
    batch: &RecordBatch,
    accumulators: &mut [SizeAccumulator],
) -> Result<(), AuditError> {
    if batch.num_columns() != schema.len() {
        return Err(AuditError::ColumnCountMismatch {
            expected: schema.len(),
            actual: batch.num_columns(),
        });
    }

    for ((field, column), acc) in schema
        .fields
        .iter()
        .zip(batch.columns())
        .zip(accumulators.iter_mut())
    {
        if field.is_measurable() {
            acc.fold(max_value_size(column.as_ref(), field.category));
        }
    }

    Ok(())
}

/// Returns the largest value size in bytes within one array.
///
/// Nulls count as zero. An array that does not match its category degrades
/// to zero with a warning.
pub fn max_value_size(array: &dyn Array, category: SizeCategory) -> u64 {
    match category {
        SizeCategory::Bool | SizeCategory::FixedWidth { .. } => {
            let width = category.fixed_width().unwrap_or(0) as u64;
            if array.len() > array.logical_null_count() {
                width
            } else {
                0
            }
        }
        SizeCategory::Utf8 | SizeCategory::Binary => {
            if let Some(dict) = array.as_any_dictionary_opt() {
                // All-null dictionaries may carry no values at all
                if dict.values().is_empty() || array.logical_null_count() == array.len() {
                    return 0;
                }
                let Some(sizes) = value_sizes(dict.values().as_ref(), category) else {
                    return unexpected_array(array, category);
                };
                let sizes: Vec<u64> = sizes.collect();
                let keys = dict.keys();
                return dict
                    .normalized_keys()
                    .into_iter()
                    .enumerate()
                    .filter(|(row, _)| keys.is_valid(*row))
                    .filter_map(|(_, key)| sizes.get(key).copied())
                    .max()
                    .unwrap_or(0);
            }

            match value_sizes(array, category) {
                Some(sizes) => sizes.max().unwrap_or(0),
                None => unexpected_array(array, category),
            }
        }
        SizeCategory::Container => 0,
    }
}

/// Yields the byte size of each value of a text or binary array.
fn value_sizes(
    array: &dyn Array,
    category: SizeCategory,
) -> Option<Box<dyn Iterator<Item = u64> + '_>> {
    fn lengths<'a, T: AsRef<[u8]> + ?Sized + 'a>(
        values: impl Iterator<Item = Option<&'a T>> + 'a,
    ) -> Box<dyn Iterator<Item = u64> + 'a> {
        Box::new(values.map(|v| v.map_or(0, |v| <T as AsRef<[u8]>>::as_ref(v).len() as u64)))
    }

    match category {
        SizeCategory::Utf8 => {
            if let Some(a) = array.as_string_opt::<i32>() {
                Some(lengths(a.iter()))
            } else if let Some(a) = array.as_string_opt::<i64>() {
                Some(lengths(a.iter()))
            } else {
                array.as_string_view_opt().map(|a| lengths(a.iter()))
            }
        }
        SizeCategory::Binary => {
            if let Some(a) = array.as_binary_opt::<i32>() {
                Some(lengths(a.iter()))
            } else if let Some(a) = array.as_binary_opt::<i64>() {
                Some(lengths(a.iter()))
            } else if let Some(a) = array.as_binary_view_opt() {
                Some(lengths(a.iter()))
            } else {
                array.as_fixed_size_binary_opt().map(|a| lengths(a.iter()))
            }
        }
        SizeCategory::Bool | SizeCategory::FixedWidth { .. } | SizeCategory::Container => None,
    }
}

fn unexpected_array(array: &dyn Array, category: SizeCategory) -> u64 {
    warn!(
        "Cannot size {} array as {}, counting it as 0 bytes",
        array.data_type(),
        category
    );
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemorySource;
    use arrow_array::types::Int32Type;
    use arrow_array::{
        ArrayRef, BinaryArray, BooleanArray, DictionaryArray, FixedSizeBinaryArray, Int32Array,
        Int64Array, LargeStringArray, ListArray, NullArray, StringArray, StringViewArray,
    };
    use checker_core::{FieldBuilder, Measurement, SchemaBuilder};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn text_schema() -> Schema {
        SchemaBuilder::new("test.parquet")
            .field(FieldBuilder::new("payload", "STRING").build())
            .build()
    }

    fn text_batch(values: Vec<Option<String>>) -> RecordBatch {
        let column: ArrayRef = Arc::new(StringArray::from(values));
        RecordBatch::try_from_iter(vec![("payload", column)]).unwrap()
    }

    fn text_of_len(len: usize) -> Option<String> {
        Some("x".repeat(len))
    }

    #[test]
    fn test_accumulator_is_monotonic() {
        let mut acc = SizeAccumulator::new();
        assert_eq!(acc.max_bytes(), 0);
        acc.fold(10);
        acc.fold(3);
        assert_eq!(acc.max_bytes(), 10);
        acc.fold(200_000);
        acc.fold(0);
        assert_eq!(acc.max_bytes(), 200_000);
    }

    #[test]
    fn test_scan_across_batches() {
        let schema = text_schema();
        let batch1 = text_batch(vec![text_of_len(1), text_of_len(10)]);
        let batch2 = text_batch(vec![text_of_len(200_000)]);

        let mut accumulators = vec![SizeAccumulator::new()];
        fold_batch(&schema, &batch1, &mut accumulators).unwrap();
        assert_eq!(accumulators[0].max_bytes(), 10);
        fold_batch(&schema, &batch2, &mut accumulators).unwrap();
        assert_eq!(accumulators[0].max_bytes(), 200_000);

        let mut source = InMemorySource::new(vec![batch1, batch2]);
        let report = SizeAuditor::new(SizeStrategy::Scan)
            .scan(&schema, &mut source)
            .unwrap();

        let column = &report.columns[0];
        assert_eq!(column.max_bytes(), Some(200_000));
        assert_eq!(format!("{:.2}", column.size_kb().unwrap()), "195.31");
        assert!(column.exceeds(126.0));
        assert_eq!(report.batches_processed, 2);
        assert_eq!(report.rows_processed, 3);
        assert_eq!(report.strategy, AppliedStrategy::Scan);
    }

    #[test]
    fn test_order_independence() {
        let schema = text_schema();
        let batches = vec![
            text_batch(vec![text_of_len(7)]),
            text_batch(vec![text_of_len(300)]),
            text_batch(vec![text_of_len(42)]),
        ];

        let forward = {
            let mut source = InMemorySource::new(batches.clone());
            SizeAuditor::default().scan(&schema, &mut source).unwrap()
        };
        let reversed = {
            let mut source = InMemorySource::new(batches.into_iter().rev().collect());
            SizeAuditor::default().scan(&schema, &mut source).unwrap()
        };

        assert_eq!(forward.columns, reversed.columns);
        assert_eq!(forward.columns[0].max_bytes(), Some(300));
    }

    #[test]
    fn test_utf8_size_is_byte_length() {
        let array = StringArray::from(vec!["héllo", "日本"]);
        // "héllo" is 6 bytes, "日本" is 6 bytes
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 6);

        let array = LargeStringArray::from(vec!["abc", "abcdefgh"]);
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 8);

        let array = StringViewArray::from(vec!["a much longer string value", "b"]);
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 26);
    }

    #[test]
    fn test_nulls_count_as_zero() {
        let array = StringArray::from(vec![None, Some("abc"), None]);
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 3);

        let array = StringArray::from(vec![None::<&str>, None]);
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 0);

        let array = BinaryArray::from_iter(vec![None::<Vec<u8>>, None]);
        assert_eq!(max_value_size(&array, SizeCategory::Binary), 0);

        let array = Int64Array::from(vec![None, None]);
        assert_eq!(
            max_value_size(&array, SizeCategory::FixedWidth { width: 8 }),
            0
        );
    }

    #[test]
    fn test_binary_size_is_raw_length() {
        let array = BinaryArray::from_iter(vec![Some(vec![0u8; 5]), None, Some(vec![1u8; 2])]);
        assert_eq!(max_value_size(&array, SizeCategory::Binary), 5);

        let array =
            FixedSizeBinaryArray::try_from_iter(vec![vec![0u8; 16], vec![1u8; 16]].into_iter())
                .unwrap();
        assert_eq!(max_value_size(&array, SizeCategory::Binary), 16);
    }

    #[test]
    fn test_fixed_width_sizes() {
        let array = Int32Array::from(vec![Some(1), None]);
        assert_eq!(
            max_value_size(&array, SizeCategory::FixedWidth { width: 4 }),
            4
        );

        let array = BooleanArray::from(vec![Some(true), None]);
        assert_eq!(max_value_size(&array, SizeCategory::Bool), 1);

        let array = NullArray::new(3);
        assert_eq!(
            max_value_size(&array, SizeCategory::FixedWidth { width: 0 }),
            0
        );

        let array = Int32Array::from(Vec::<i32>::new());
        assert_eq!(
            max_value_size(&array, SizeCategory::FixedWidth { width: 4 }),
            0
        );
    }

    #[test]
    fn test_dictionary_sizes_referenced_values() {
        let array: DictionaryArray<Int32Type> =
            vec![Some("ab"), None, Some("abcdef"), Some("ab")]
                .into_iter()
                .collect();
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 6);
    }

    #[test]
    fn test_all_null_dictionary_is_zero() {
        let array: DictionaryArray<Int32Type> = vec![None::<&str>, None].into_iter().collect();
        assert!(array.values().is_empty());
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 0);
        assert_eq!(max_value_size(&array, SizeCategory::Binary), 0);

        let array: DictionaryArray<Int32Type> = Vec::<Option<&str>>::new().into_iter().collect();
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 0);
    }

    #[test]
    fn test_scan_progress_total() {
        let mut progress = ScanProgress::new(5, Some(2));
        assert_eq!(progress.total(), Some(3));
        assert_eq!(progress.to_string(), "batch 0 / 3");

        progress.advance();
        progress.advance();
        assert_eq!(progress.processed(), 2);
        assert_eq!(progress.to_string(), "batch 2 / 3");

        assert_eq!(ScanProgress::new(0, Some(2)).total(), None);
        assert_eq!(ScanProgress::new(10, None).to_string(), "batch 0");
        assert_eq!(ScanProgress::new(4, Some(2)).total(), Some(2));
    }

    #[test]
    fn test_scan_counts_expected_batches() {
        let schema = SchemaBuilder::new("test.parquet")
            .field(FieldBuilder::new("payload", "STRING").build())
            .num_rows(5)
            .build();
        let mut source = InMemorySource::new(vec![
            text_batch(vec![text_of_len(1), text_of_len(2)]),
            text_batch(vec![text_of_len(3), None]),
            text_batch(vec![text_of_len(4)]),
        ]);

        let auditor = SizeAuditor::new(SizeStrategy::Scan).with_batch_size(2);
        let report = auditor.scan(&schema, &mut source).unwrap();

        assert_eq!(report.batches_processed, 3);
        assert_eq!(
            ScanProgress::new(schema.num_rows, Some(2)).total(),
            Some(report.batches_processed)
        );
        assert_eq!(report.rows_processed, 5);
    }

    #[tokio::test]
    async fn test_elapsed_counts_from_given_start() {
        let start = Instant::now() - Duration::from_millis(50);
        let mut source = InMemorySource::default();

        let report = SizeAuditor::new(SizeStrategy::Scan)
            .audit_since(start, &text_schema(), &mut source)
            .await
            .unwrap();

        assert!(report.elapsed >= Duration::from_millis(50));
    }

    #[test]
    fn test_mismatched_array_degrades_to_zero() {
        let array = Int32Array::from(vec![1, 2, 3]);
        assert_eq!(max_value_size(&array, SizeCategory::Utf8), 0);
    }

    #[test]
    fn test_container_columns_are_unmeasured() {
        let schema = SchemaBuilder::new("test.parquet")
            .field(FieldBuilder::new("id", "INT32").build())
            .field(
                FieldBuilder::new("tags", "LIST")
                    .child(FieldBuilder::new("item", "INT32").build())
                    .build(),
            )
            .build();

        let ids: ArrayRef = Arc::new(Int32Array::from(vec![1, 2]));
        let tags: ArrayRef = Arc::new(ListArray::from_iter_primitive::<Int32Type, _, _>(vec![
            Some(vec![Some(1), Some(2), Some(3)]),
            None,
        ]));
        let batch = RecordBatch::try_from_iter(vec![("id", ids), ("tags", tags)]).unwrap();

        let mut source = InMemorySource::new(vec![batch]);
        let report = SizeAuditor::default().scan(&schema, &mut source).unwrap();

        assert_eq!(report.columns[0], ColumnSize::measured("id", 4));
        assert_eq!(report.columns[1].measurement, Measurement::Unmeasured);
        assert!(report.has_unmeasured());
    }

    #[test]
    fn test_column_count_mismatch_aborts() {
        let schema = SchemaBuilder::new("test.parquet")
            .field(FieldBuilder::new("a", "STRING").build())
            .field(FieldBuilder::new("b", "STRING").build())
            .build();

        let mut source = InMemorySource::new(vec![text_batch(vec![text_of_len(3)])]);
        let result = SizeAuditor::default().scan(&schema, &mut source);
        assert!(matches!(
            result,
            Err(AuditError::ColumnCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_empty_source_reports_zero() {
        let schema = text_schema();
        let mut source = InMemorySource::default();
        let report = SizeAuditor::default().scan(&schema, &mut source).unwrap();
        assert_eq!(report.columns, vec![ColumnSize::measured("payload", 0)]);
        assert_eq!(report.batches_processed, 0);
    }

    /// Answers aggregates from precomputed values and refuses to scan.
    struct AggregateOnly {
        sizes: Vec<(String, u64)>,
        queried: Vec<String>,
    }

    impl DataAccess for AggregateOnly {
        fn next_batch(&mut self) -> Result<Option<RecordBatch>, AuditError> {
            Err(AuditError::data_access("scan not expected"))
        }

        fn supports_aggregates(&self) -> bool {
            true
        }

        async fn max_value_size(&mut self, field: &Field) -> Result<u64, AuditError> {
            self.queried.push(field.name.clone());
            Ok(self
                .sizes
                .iter()
                .find(|(name, _)| *name == field.name)
                .map(|(_, size)| *size)
                .unwrap_or(0))
        }
    }

    #[tokio::test]
    async fn test_auto_prefers_push_down() {
        let schema = SchemaBuilder::new("test.parquet")
            .field(FieldBuilder::new("payload", "STRING").build())
            .field(FieldBuilder::new("meta", "STRUCT").build())
            .build();
        let mut access = AggregateOnly {
            sizes: vec![("payload".to_string(), 200_000), ("meta".to_string(), 999)],
            queried: Vec::new(),
        };

        let report = SizeAuditor::new(SizeStrategy::Auto)
            .audit(&schema, &mut access)
            .await
            .unwrap();

        assert_eq!(report.strategy, AppliedStrategy::PushDown);
        assert_eq!(report.columns[0], ColumnSize::measured("payload", 200_000));
        assert_eq!(report.columns[1], ColumnSize::unmeasured("meta"));
        assert_eq!(access.queried, vec!["payload".to_string()]);
    }

    #[tokio::test]
    async fn test_push_down_falls_back_to_scan() {
        let schema = text_schema();
        let mut source = InMemorySource::new(vec![text_batch(vec![text_of_len(12)])]);

        let report = SizeAuditor::new(SizeStrategy::PushDown)
            .audit(&schema, &mut source)
            .await
            .unwrap();

        assert_eq!(report.strategy, AppliedStrategy::Scan);
        assert_eq!(report.columns[0].max_bytes(), Some(12));
    }

    #[tokio::test]
    async fn test_scan_strategy_ignores_aggregates() {
        let schema = text_schema();
        let mut access = AggregateOnly {
            sizes: vec![],
            queried: Vec::new(),
        };

        let result = SizeAuditor::new(SizeStrategy::Scan)
            .audit(&schema, &mut access)
            .await;

        assert!(matches!(result, Err(AuditError::DataAccess(_))));
        assert!(access.queried.is_empty());
    }
}
