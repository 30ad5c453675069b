//! # Parquet Checker Core
//!
//! Core data structures for auditing columnar files before ingestion.
//!
//! An audit answers two questions about a file:
//!
//! - Does every leaf column's declared type belong to the supported allow-list?
//! - What is the largest serialized value in each column, and does it exceed
//!   the downstream store's per-value ceiling (126 KiB by default)?
//!
//! ## Key Concepts
//!
//! - **Schema**: Ordered fields read from a file footer
//! - **TypeDescriptor**: A declared type tag with an allow-list canonical form
//! - **SizeCategory**: How values of a column are measured
//! - **AuditReport**: Violations plus per-column size results
//!
//! ## Example
//!
//! ```rust
//! use checker_core::{ColumnSize, FieldBuilder, SchemaBuilder};
//!
//! let schema = SchemaBuilder::new("events.parquet")
//!     .field(FieldBuilder::new("payload", "STRING").build())
//!     .build();
//!
//! let size = ColumnSize::measured("payload", 200_000);
//! assert!(size.exceeds(126.0));
//! assert_eq!(schema.fields[0].name, size.name);
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod report;
pub mod schema;

pub use builder::*;
pub use context::*;
pub use error::*;
pub use report::*;
pub use schema::*;
