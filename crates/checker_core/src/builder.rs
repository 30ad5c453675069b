//! Builder pattern for assembling schemas by hand.
//!
//! Loaders produce [`Schema`] values directly from file footers; these
//! builders exist for callers that describe a schema themselves, such as
//! tests and in-memory sources.

use crate::{Field, Schema, SizeCategory, TypeDescriptor};

/// Builder for creating a `Schema`.
///
/// # Example
///
/// ```rust
/// use checker_core::{FieldBuilder, SchemaBuilder};
///
/// let schema = SchemaBuilder::new("memory://events")
///     .field(FieldBuilder::new("id", "INT64").build())
///     .num_rows(10)
///     .build();
///
/// assert_eq!(schema.num_rows, 10);
/// ```
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    location: String,
    fields: Vec<Field>,
    num_rows: u64,
    num_row_groups: usize,
}

impl SchemaBuilder {
    /// Creates a new schema builder for the given location.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    /// Adds a top-level field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Replaces all top-level fields.
    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Sets the row count.
    pub fn num_rows(mut self, num_rows: u64) -> Self {
        self.num_rows = num_rows;
        self
    }

    /// Sets the row group count.
    pub fn num_row_groups(mut self, num_row_groups: usize) -> Self {
        self.num_row_groups = num_row_groups;
        self
    }

    /// Builds the schema.
    pub fn build(self) -> Schema {
        Schema {
            fields: self.fields,
            location: self.location,
            num_rows: self.num_rows,
            num_row_groups: self.num_row_groups,
        }
    }
}

/// Builder for creating a `Field`.
///
/// The size category is inferred from the type tag unless set explicitly.
///
/// # Example
///
/// ```rust
/// use checker_core::{FieldBuilder, SizeCategory};
///
/// let field = FieldBuilder::new("root", "STRUCT")
///     .child(FieldBuilder::new("inner", "INT32").build())
///     .build();
///
/// assert!(field.is_container());
/// assert_eq!(field.category, SizeCategory::Container);
/// assert_eq!(field.children[0].category, SizeCategory::FixedWidth { width: 4 });
/// ```
#[derive(Debug, Default)]
pub struct FieldBuilder {
    name: String,
    data_type: String,
    nullable: bool,
    category: Option<SizeCategory>,
    children: Vec<Field>,
}

impl FieldBuilder {
    /// Creates a new field builder.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name
    /// * `data_type` - Declared type tag (e.g., "INT32", "TIMESTAMP[us]")
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            ..Default::default()
        }
    }

    /// Sets whether the field is nullable.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Overrides the inferred size category.
    pub fn category(mut self, category: SizeCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Adds a child field.
    pub fn child(mut self, child: Field) -> Self {
        self.children.push(child);
        self
    }

    /// Builds the field.
    pub fn build(self) -> Field {
        let data_type = TypeDescriptor::new(self.data_type);
        let category = self
            .category
            .unwrap_or_else(|| SizeCategory::infer(&data_type));

        Field {
            name: self.name,
            data_type,
            nullable: self.nullable,
            category,
            children: self.children,
        }
    }
}
