//! Schema types for audited files.
//!
//! This module contains the Arrow-independent view of a columnar file's
//! schema: an ordered list of fields, each carrying its declared type tag and
//! the size category the auditor uses to measure its values.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Matches the bare tag in front of any `(...)`, `[...]` or `<...>` parameter suffix.
static TAG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([^(\[<]*)").expect("tag prefix regex is valid"));

/// Canonical tags of container types. Containers are always allowed; only
/// their leaf children are checked against the allow-list.
const CONTAINER_TAGS: &[&str] = &[
    "LIST",
    "LARGE_LIST",
    "FIXED_SIZE_LIST",
    "LIST_VIEW",
    "LARGE_LIST_VIEW",
    "STRUCT",
    "MAP",
];

/// Ordered schema of an audited file.
///
/// Field order is significant and is preserved by every component that
/// consumes the schema.
///
/// # Example
///
/// ```rust
/// use checker_core::{FieldBuilder, SchemaBuilder};
///
/// let schema = SchemaBuilder::new("data/events.parquet")
///     .field(FieldBuilder::new("id", "INT64").nullable(false).build())
///     .field(FieldBuilder::new("payload", "STRING").build())
///     .build();
///
/// assert_eq!(schema.len(), 2);
/// assert_eq!(schema.fields[1].name, "payload");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Top-level fields in file order
    pub fields: Vec<Field>,

    /// Location the schema was read from (file path or URI)
    pub location: String,

    /// Total number of rows recorded in the file footer
    pub num_rows: u64,

    /// Number of row groups recorded in the file footer
    pub num_row_groups: usize,
}

impl Schema {
    /// Returns the number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a top-level field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A single field of the schema.
///
/// A field with a container type (list, struct, map) owns its children;
/// every other field is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name (not the dotted path)
    pub name: String,

    /// Declared type, including any parameters
    #[serde(rename = "type")]
    pub data_type: TypeDescriptor,

    /// Whether the field may hold null values
    pub nullable: bool,

    /// How values of this field are sized
    pub category: SizeCategory,

    /// Child fields, empty for leaves
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Field>,
}

impl Field {
    /// Returns true if this is a list, struct or map field.
    pub fn is_container(&self) -> bool {
        self.data_type.is_container()
    }

    /// Returns true if values of this field can be given a numeric size.
    pub fn is_measurable(&self) -> bool {
        !self.category.is_container()
    }
}

/// A declared type tag such as `INT32`, `DECIMAL128(10, 2)` or `TIMESTAMP[us]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor(String);

impl TypeDescriptor {
    /// Creates a type descriptor from its declared form.
    pub fn new(declared: impl Into<String>) -> Self {
        Self(declared.into())
    }

    /// Returns the declared form, parameters included.
    pub fn declared(&self) -> &str {
        &self.0
    }

    /// Returns the canonical tag: parameters stripped, trimmed, uppercased.
    ///
    /// ```rust
    /// use checker_core::TypeDescriptor;
    ///
    /// assert_eq!(TypeDescriptor::new("DECIMAL128(10,2)").canonical(), "DECIMAL128");
    /// assert_eq!(TypeDescriptor::new("timestamp[us]").canonical(), "TIMESTAMP");
    /// ```
    pub fn canonical(&self) -> String {
        canonical_tag(&self.0)
    }

    /// Returns true if the canonical tag names a container type.
    pub fn is_container(&self) -> bool {
        let canonical = self.canonical();
        CONTAINER_TAGS.contains(&canonical.as_str())
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TypeDescriptor {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Strips any parameter suffix from a type tag and uppercases the rest.
pub fn canonical_tag(declared: &str) -> String {
    TAG_PREFIX
        .captures(declared)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

/// How the values of a column are sized.
///
/// The set is closed: every leaf column falls into exactly one category
/// and the auditor matches on all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeCategory {
    /// Boolean values, one byte each
    Bool,
    /// Fixed-width values (numbers, dates, times, decimals)
    FixedWidth {
        /// In-memory width of a single value in bytes
        width: usize,
    },
    /// Variable-length UTF-8 text
    Utf8,
    /// Variable-length raw bytes
    Binary,
    /// Nested values whose size is defined by child fields
    Container,
}

impl SizeCategory {
    /// Returns true for the container category.
    pub fn is_container(&self) -> bool {
        matches!(self, SizeCategory::Container)
    }

    /// Returns the byte width of a single value for fixed-size categories.
    pub fn fixed_width(&self) -> Option<usize> {
        match self {
            SizeCategory::Bool => Some(1),
            SizeCategory::FixedWidth { width } => Some(*width),
            SizeCategory::Utf8 | SizeCategory::Binary | SizeCategory::Container => None,
        }
    }

    /// Infers a category from a declared type tag.
    ///
    /// Used when fields are assembled by hand rather than read from a file;
    /// loaders that know the physical type should assign the category directly.
    pub fn infer(data_type: &TypeDescriptor) -> Self {
        if data_type.is_container() {
            return SizeCategory::Container;
        }

        match data_type.canonical().as_str() {
            "BOOL" | "BOOLEAN" => SizeCategory::Bool,
            "NA" | "NULL" => SizeCategory::FixedWidth { width: 0 },
            "INT8" | "UINT8" => SizeCategory::FixedWidth { width: 1 },
            "INT16" | "UINT16" | "HALFFLOAT" => SizeCategory::FixedWidth { width: 2 },
            "INT32" | "UINT32" | "FLOAT" | "DATE32" | "TIME32" => {
                SizeCategory::FixedWidth { width: 4 }
            }
            "INT64" | "UINT64" | "DOUBLE" | "DATE64" | "TIME64" | "TIMESTAMP" | "DURATION" => {
                SizeCategory::FixedWidth { width: 8 }
            }
            "DECIMAL128" | "INTERVAL" => SizeCategory::FixedWidth { width: 16 },
            "DECIMAL256" => SizeCategory::FixedWidth { width: 32 },
            "STRING" | "LARGE_STRING" | "STRING_VIEW" | "UTF8" => SizeCategory::Utf8,
            "BINARY" | "LARGE_BINARY" | "BINARY_VIEW" => SizeCategory::Binary,
            _ => SizeCategory::Container,
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeCategory::Bool => write!(f, "bool"),
            SizeCategory::FixedWidth { width } => write!(f, "fixed({} bytes)", width),
            SizeCategory::Utf8 => write!(f, "utf8"),
            SizeCategory::Binary => write!(f, "binary"),
            SizeCategory::Container => write!(f, "container"),
        }
    }
}
