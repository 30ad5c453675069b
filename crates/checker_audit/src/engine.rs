//! Main audit engine.
//!
//! This module provides the [`AuditEngine`] that runs the type check and,
//! when enabled, the size audit for one schema.

use crate::{AuditError, DataAccess, SizeAuditor, TypeValidator};
use checker_core::{AuditContext, AuditReport, Schema, Violation};
use tracing::{info, warn};

/// Audit engine for columnar files.
///
/// The type check needs only the schema; the size audit also needs a
/// [`DataAccess`] capability. The two share no state.
///
/// # Example
///
/// ```rust
/// use checker_audit::{AuditEngine, InMemorySource};
/// use checker_core::{AuditContext, FieldBuilder, SchemaBuilder};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let schema = SchemaBuilder::new("memory://example")
///     .field(FieldBuilder::new("x", "INTERVAL").build())
///     .build();
///
/// let engine = AuditEngine::new(AuditContext::new());
/// let mut source = InMemorySource::default();
/// let report = engine.audit(schema, &mut source).await.unwrap();
///
/// assert_eq!(report.violations.len(), 1);
/// assert!(report.sizes.is_none());
/// # }
/// ```
pub struct AuditEngine {
    type_validator: TypeValidator,
    size_auditor: SizeAuditor,
    context: AuditContext,
}

impl AuditEngine {
    /// Creates a new audit engine.
    pub fn new(context: AuditContext) -> Self {
        Self {
            type_validator: TypeValidator::new(),
            size_auditor: SizeAuditor::new(context.strategy).with_batch_size(context.batch_size),
            context,
        }
    }

    /// Returns the context this engine was built with.
    pub fn context(&self) -> &AuditContext {
        &self.context
    }

    /// Runs only the type check.
    pub fn validate_types(&self, schema: &Schema) -> Vec<Violation> {
        let violations = self.type_validator.validate(schema);
        if violations.is_empty() {
            info!("All {} column type(s) are supported", schema.len());
        } else {
            warn!("{} column(s) have unsupported types", violations.len());
        }
        violations
    }

    /// Audits a schema without touching any data.
    pub fn check_schema(&self, schema: Schema) -> AuditReport {
        let violations = self.validate_types(&schema);
        AuditReport {
            schema,
            violations,
            sizes: None,
        }
    }

    /// Audits a schema and, if the context enables it, its element sizes.
    ///
    /// The type check always runs. A data-access failure during the size
    /// phase aborts the audit; there is no partial size report.
    pub async fn audit<A: DataAccess>(
        &self,
        schema: Schema,
        access: &mut A,
    ) -> Result<AuditReport, AuditError> {
        let mut report = self.check_schema(schema);

        if self.context.check_element_sizes {
            let sizes = self.size_auditor.audit(&report.schema, access).await?;
            let exceeding = sizes.exceeding(self.context.size_limit_kb).count();
            if exceeding > 0 {
                warn!(
                    "{} column(s) exceed {} KB",
                    exceeding, self.context.size_limit_kb
                );
            }
            report.sizes = Some(sizes);
        }

        Ok(report)
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new(AuditContext::default())
    }
}
