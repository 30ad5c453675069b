//! Schema extraction from Parquet footers.

use crate::{converter::convert_arrow_field, ParquetSourceError};
use checker_core::{Schema, SchemaBuilder};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Reads the schema of a Parquet file without reading any column data.
pub struct SchemaLoader;

impl SchemaLoader {
    /// Loads the schema, row count and row-group count from the footer.
    ///
    /// The file handle is released before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or its footer cannot be
    /// decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<Schema, ParquetSourceError> {
        let path = path.as_ref();
        info!("Reading Parquet footer from {}", path.display());

        let builder = ParquetRecordBatchReaderBuilder::try_new(open_file(path)?)?;
        let file_metadata = builder.metadata().file_metadata();
        let num_rows = file_metadata.num_rows().max(0) as u64;
        let num_row_groups = builder.metadata().num_row_groups();

        let fields = builder
            .schema()
            .fields()
            .iter()
            .map(|field| convert_arrow_field(field))
            .collect::<Vec<_>>();

        debug!(
            "Extracted {} fields, {} rows in {} row groups",
            fields.len(),
            num_rows,
            num_row_groups
        );

        Ok(SchemaBuilder::new(path.display().to_string())
            .fields(fields)
            .num_rows(num_rows)
            .num_row_groups(num_row_groups)
            .build())
    }
}

pub(crate) fn open_file(path: &Path) -> Result<File, ParquetSourceError> {
    File::open(path).map_err(|source| ParquetSourceError::Open {
        path: path.to_path_buf(),
        source,
    })
}
