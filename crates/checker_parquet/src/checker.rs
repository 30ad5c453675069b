//! File-level audit orchestration.

use crate::{DataFusionSource, ParquetBatchReader, SchemaLoader};
use checker_audit::{AuditEngine, SizeAuditor};
use checker_core::{
    AuditContext, AuditReport, Result, Schema, SizeReport, SizeStrategy, Violation,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

/// Audits one Parquet file.
///
/// Loads the schema from the footer, validates its types and, when the
/// context asks for it, audits element sizes with the configured strategy.
pub struct ParquetChecker {
    path: PathBuf,
    context: AuditContext,
}

impl ParquetChecker {
    /// Creates a checker for the file at `path`.
    pub fn new(path: impl Into<PathBuf>, context: AuditContext) -> Self {
        Self {
            path: path.into(),
            context,
        }
    }

    /// Returns the audited file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the audit context.
    pub fn context(&self) -> &AuditContext {
        &self.context
    }

    /// Reads the schema from the file footer.
    pub fn load_schema(&self) -> Result<Schema> {
        Ok(SchemaLoader::load(&self.path)?)
    }

    /// Checks every leaf type of `schema` against the allow-list.
    pub fn validate_types(&self, schema: &Schema) -> Vec<Violation> {
        AuditEngine::new(self.context.clone()).validate_types(schema)
    }

    /// Audits element sizes of an already loaded schema.
    ///
    /// Scan uses a [`ParquetBatchReader`]; auto and push-down register the
    /// file with DataFusion. Either way the file is released on return. The
    /// elapsed time includes opening the file.
    pub async fn audit_sizes(&self, schema: &Schema) -> Result<SizeReport> {
        let start = Instant::now();
        let batch_size = self.context.batch_size;
        let auditor = SizeAuditor::new(self.context.strategy).with_batch_size(batch_size);

        let report = match self.context.strategy {
            SizeStrategy::Scan => {
                info!("Using a row-batch scan for {}", self.path.display());
                let mut reader = ParquetBatchReader::open(&self.path, batch_size)?;
                auditor.audit_since(start, schema, &mut reader).await?
            }
            SizeStrategy::Auto | SizeStrategy::PushDown => {
                info!("Using DataFusion push-down for {}", self.path.display());
                let mut source = DataFusionSource::open(&self.path, batch_size).await?;
                auditor.audit_since(start, schema, &mut source).await?
            }
        };

        let exceeding = report.exceeding(self.context.size_limit_kb).count();
        if exceeding > 0 {
            warn!(
                "{} column(s) exceed {} KB",
                exceeding, self.context.size_limit_kb
            );
        }

        Ok(report)
    }

    /// Runs the audit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read. Unsupported types and
    /// oversized values are reported, not returned as errors.
    pub async fn run(&self) -> Result<AuditReport> {
        let schema = self.load_schema()?;
        let violations = self.validate_types(&schema);

        let sizes = if self.context.check_element_sizes {
            Some(self.audit_sizes(&schema).await?)
        } else {
            None
        };

        Ok(AuditReport {
            schema,
            violations,
            sizes,
        })
    }
}
