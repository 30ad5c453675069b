//! Aggregate push-down through DataFusion.
//!
//! Each measurable column gets one query that returns its largest value
//! size in bytes as a single BIGINT. Nulls are ignored by the aggregate, and
//! a column without values yields 0.

use crate::{ParquetBatchReader, ParquetSourceError};
use arrow_array::cast::AsArray;
use arrow_array::types::Int64Type;
use arrow_array::{Array, RecordBatch};
use checker_audit::{AuditError, DataAccess};
use checker_core::{Field, SizeCategory};
use datafusion::prelude::{ParquetReadOptions, SessionContext};
use std::path::Path;
use tracing::{debug, info};

const TABLE_NAME: &str = "audited";

/// A Parquet file registered with a DataFusion session.
///
/// Answers [`DataAccess::max_value_size`] with SQL aggregates and keeps a
/// [`ParquetBatchReader`] for callers that still want a scan.
pub struct DataFusionSource {
    ctx: SessionContext,
    scan: ParquetBatchReader,
}

impl DataFusionSource {
    /// Registers `path` with a fresh session.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or registered.
    pub async fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self, ParquetSourceError> {
        let path = path.as_ref();
        let scan = ParquetBatchReader::open(path, batch_size)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let location = path.to_string_lossy().into_owned();

        info!("Registering {} with DataFusion", location);
        let ctx = SessionContext::new();
        ctx.register_parquet(
            TABLE_NAME,
            &location,
            ParquetReadOptions::default().file_extension(&extension),
        )
        .await?;

        Ok(Self { ctx, scan })
    }

    /// Runs the aggregate query for one column.
    pub async fn query_max_size(&self, field: &Field) -> Result<u64, ParquetSourceError> {
        let Some(sql) = max_size_sql(TABLE_NAME, field) else {
            return Ok(0);
        };

        debug!("Push-down query for column '{}': {}", field.name, sql);
        let batches = self.ctx.sql(&sql).await?.collect().await?;
        single_bigint(&field.name, &batches)
    }
}

impl DataAccess for DataFusionSource {
    fn next_batch(&mut self) -> Result<Option<RecordBatch>, AuditError> {
        self.scan.next_batch()
    }

    fn supports_aggregates(&self) -> bool {
        true
    }

    async fn max_value_size(&mut self, field: &Field) -> Result<u64, AuditError> {
        Ok(self.query_max_size(field).await?)
    }
}

/// Builds the aggregate query returning a column's largest value size.
///
/// Returns `None` for container columns, which are never queried.
///
/// ```rust
/// use checker_core::FieldBuilder;
/// use checker_parquet::max_size_sql;
///
/// let field = FieldBuilder::new("name", "STRING").build();
/// assert_eq!(
///     max_size_sql("t", &field).unwrap(),
///     r#"SELECT CAST(MAX(octet_length("name")) AS BIGINT) AS max_bytes FROM "t""#
/// );
/// ```
pub fn max_size_sql(table: &str, field: &Field) -> Option<String> {
    let column = quote_ident(&field.name);
    let expr = match field.category {
        SizeCategory::Utf8 => format!("MAX(octet_length({}))", column),
        // octet_length only takes strings; hex doubles the byte count
        SizeCategory::Binary => format!(
            "MAX(octet_length(encode(CAST({} AS BYTEA), 'hex'))) / 2",
            column
        ),
        SizeCategory::Bool | SizeCategory::FixedWidth { .. } => format!(
            "CASE WHEN COUNT({}) > 0 THEN {} ELSE 0 END",
            column,
            field.category.fixed_width()?
        ),
        SizeCategory::Container => return None,
    };

    Some(format!(
        "SELECT CAST({} AS BIGINT) AS max_bytes FROM {}",
        expr,
        quote_ident(table)
    ))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn single_bigint(column: &str, batches: &[RecordBatch]) -> Result<u64, ParquetSourceError> {
    let Some(batch) = batches.iter().find(|b| b.num_rows() > 0) else {
        return Ok(0);
    };

    let values = batch
        .column(0)
        .as_primitive_opt::<Int64Type>()
        .ok_or_else(|| {
            ParquetSourceError::query_result(
                column,
                format!("expected BIGINT, got {}", batch.column(0).data_type()),
            )
        })?;

    if values.is_null(0) {
        Ok(0)
    } else {
        Ok(values.value(0).max(0) as u64)
    }
}
