//! Audit options shared by every phase.
//!
//! An [`AuditContext`] is built once (from defaults, a config file and CLI
//! flags) and handed read-only to the validator, the size auditor and the
//! report renderer.

use crate::DEFAULT_SIZE_LIMIT_KB;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of rows per scanned batch.
pub const DEFAULT_BATCH_SIZE: usize = 1024;

/// Requested strategy for the size-audit phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeStrategy {
    /// Push down when the data source supports it, otherwise scan
    #[default]
    Auto,
    /// Always scan row batches
    Scan,
    /// Prefer aggregate queries; falls back to a scan when unsupported
    PushDown,
}

impl fmt::Display for SizeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeStrategy::Auto => write!(f, "auto"),
            SizeStrategy::Scan => write!(f, "scan"),
            SizeStrategy::PushDown => write!(f, "push-down"),
        }
    }
}

/// Options for an audit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditContext {
    /// Whether to run the size-audit phase
    pub check_element_sizes: bool,

    /// Rows per batch for the row-batch scan
    pub batch_size: usize,

    /// Per-value ceiling in KiB above which a column is flagged
    pub size_limit_kb: f64,

    /// Strategy for the size-audit phase
    pub strategy: SizeStrategy,

    /// Whether the report uses terminal emphasis
    pub highlight: bool,
}

impl Default for AuditContext {
    fn default() -> Self {
        Self {
            check_element_sizes: false,
            batch_size: DEFAULT_BATCH_SIZE,
            size_limit_kb: DEFAULT_SIZE_LIMIT_KB,
            strategy: SizeStrategy::Auto,
            highlight: true,
        }
    }
}

impl AuditContext {
    /// Creates a context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables the size-audit phase.
    pub fn with_element_sizes(mut self, enabled: bool) -> Self {
        self.check_element_sizes = enabled;
        self
    }

    /// Sets the scan batch size. Zero is clamped to one row.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Sets the size ceiling in KiB.
    pub fn with_size_limit_kb(mut self, limit_kb: f64) -> Self {
        self.size_limit_kb = limit_kb;
        self
    }

    /// Sets the size strategy.
    pub fn with_strategy(mut self, strategy: SizeStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enables or disables terminal emphasis.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}
