//! # Parquet Checker Audit
//!
//! Audit logic for columnar files about to be ingested into a constrained
//! store:
//!
//! - Type validation: every leaf type must be on the allow-list
//! - Element sizes: the largest serialized value per column, by row-batch
//!   scan or aggregate push-down
//!
//! ## Example
//!
//! ```rust
//! use checker_audit::TypeValidator;
//! use checker_core::{FieldBuilder, SchemaBuilder};
//!
//! let schema = SchemaBuilder::new("events.parquet")
//!     .field(
//!         FieldBuilder::new("root", "STRUCT")
//!             .child(FieldBuilder::new("inner", "INTERVAL").build())
//!             .build(),
//!     )
//!     .build();
//!
//! let violations = TypeValidator::new().validate(&schema);
//! assert_eq!(violations[0].path, "root.inner");
//! ```

mod engine;
mod error;
mod sizes;
mod source;
mod types;

pub use engine::*;
pub use error::*;
pub use sizes::*;
pub use source::*;
pub use types::*;
