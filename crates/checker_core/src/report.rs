//! Audit findings and reports.
//!
//! Findings are plain values: an unsupported type or an oversized column is
//! something to report, never an error.

use crate::Schema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-value size ceiling of the downstream store, in KiB.
pub const DEFAULT_SIZE_LIMIT_KB: f64 = 126.0;

/// A leaf field whose type is not on the allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Dotted path from the top-level field down to the leaf
    pub path: String,

    /// Declared type of the leaf, parameters included
    #[serde(rename = "type")]
    pub data_type: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(path: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            data_type: data_type.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Column '{}' has unsupported type: {}",
            self.path, self.data_type
        )
    }
}

/// Outcome of sizing one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Measurement {
    /// Largest serialized value size observed, in bytes
    Measured {
        /// Maximum value size in bytes
        max_bytes: u64,
    },
    /// Nested column; sizing is not supported
    Unmeasured,
}

/// Size result for one top-level column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSize {
    /// Column name
    pub name: String,

    /// Measured maximum or the unmeasured marker
    pub measurement: Measurement,
}

impl ColumnSize {
    /// Creates a measured column result.
    pub fn measured(name: impl Into<String>, max_bytes: u64) -> Self {
        Self {
            name: name.into(),
            measurement: Measurement::Measured { max_bytes },
        }
    }

    /// Creates an unmeasured column result.
    pub fn unmeasured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            measurement: Measurement::Unmeasured,
        }
    }

    /// Returns the maximum size in bytes, if measured.
    pub fn max_bytes(&self) -> Option<u64> {
        match self.measurement {
            Measurement::Measured { max_bytes } => Some(max_bytes),
            Measurement::Unmeasured => None,
        }
    }

    /// Returns the maximum size in KiB, if measured.
    pub fn size_kb(&self) -> Option<f64> {
        self.max_bytes().map(|bytes| bytes as f64 / 1024.0)
    }

    /// Returns true if the measured size is strictly above `limit_kb`.
    pub fn exceeds(&self, limit_kb: f64) -> bool {
        self.size_kb().is_some_and(|kb| kb > limit_kb)
    }

    /// Returns true for nested columns that were skipped.
    pub fn is_unmeasured(&self) -> bool {
        matches!(self.measurement, Measurement::Unmeasured)
    }
}

/// Which data-access strategy produced a size report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppliedStrategy {
    /// Full row-batch scan
    Scan,
    /// Column aggregate queries answered by the storage engine
    PushDown,
}

impl fmt::Display for AppliedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppliedStrategy::Scan => write!(f, "row-batch scan"),
            AppliedStrategy::PushDown => write!(f, "aggregate push-down"),
        }
    }
}

/// Result of the size-audit phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeReport {
    /// One entry per top-level column, in schema order
    pub columns: Vec<ColumnSize>,

    /// Strategy that produced the sizes
    pub strategy: AppliedStrategy,

    /// Number of batches folded (0 for push-down)
    pub batches_processed: usize,

    /// Number of rows folded (0 for push-down)
    pub rows_processed: u64,

    /// Wall time of the size phase
    pub elapsed: Duration,
}

impl SizeReport {
    /// Returns true if any column was skipped as nested.
    pub fn has_unmeasured(&self) -> bool {
        self.columns.iter().any(ColumnSize::is_unmeasured)
    }

    /// Returns the columns whose size is above `limit_kb`.
    pub fn exceeding(&self, limit_kb: f64) -> impl Iterator<Item = &ColumnSize> {
        self.columns.iter().filter(move |c| c.exceeds(limit_kb))
    }

    /// Looks up the result for a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSize> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Complete audit of one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    /// Schema as read from the file footer
    pub schema: Schema,

    /// Unsupported leaf types, in depth-first schema order
    pub violations: Vec<Violation>,

    /// Size results, present when the size phase ran
    pub sizes: Option<SizeReport>,
}

impl AuditReport {
    /// Returns true if no leaf type violates the allow-list.
    pub fn types_supported(&self) -> bool {
        self.violations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_display() {
        let violation = Violation::new("root.inner", "INTERVAL[month_day_nano]");
        assert_eq!(
            violation.to_string(),
            "Column 'root.inner' has unsupported type: INTERVAL[month_day_nano]"
        );
    }

    #[test]
    fn test_size_kb_and_exceeds() {
        let column = ColumnSize::measured("payload", 200_000);
        let kb = column.size_kb().unwrap();
        assert_eq!(format!("{:.2}", kb), "195.31");
        assert!(column.exceeds(DEFAULT_SIZE_LIMIT_KB));

        let small = ColumnSize::measured("id", 8);
        assert!(!small.exceeds(DEFAULT_SIZE_LIMIT_KB));
    }

    #[test]
    fn test_exactly_at_limit_does_not_exceed() {
        let column = ColumnSize::measured("payload", 126 * 1024);
        assert!(!column.exceeds(DEFAULT_SIZE_LIMIT_KB));

        let column = ColumnSize::measured("payload", 126 * 1024 + 1);
        assert!(column.exceeds(DEFAULT_SIZE_LIMIT_KB));
    }

    #[test]
    fn test_unmeasured_never_exceeds() {
        let column = ColumnSize::unmeasured("tags");
        assert!(column.is_unmeasured());
        assert_eq!(column.size_kb(), None);
        assert!(!column.exceeds(0.0));
    }

    #[test]
    fn test_size_report_helpers() {
        let report = SizeReport {
            columns: vec![
                ColumnSize::measured("id", 8),
                ColumnSize::measured("blob", 300 * 1024),
                ColumnSize::unmeasured("tags"),
            ],
            strategy: AppliedStrategy::Scan,
            batches_processed: 2,
            rows_processed: 10,
            elapsed: Duration::from_millis(5),
        };

        assert!(report.has_unmeasured());
        let exceeding: Vec<_> = report.exceeding(DEFAULT_SIZE_LIMIT_KB).collect();
        assert_eq!(exceeding.len(), 1);
        assert_eq!(exceeding[0].name, "blob");
        assert_eq!(report.column("id").and_then(|c| c.max_bytes()), Some(8));
    }
}
