//! Column type validation.
//!
//! Walks the schema depth-first and checks every leaf type against the
//! allow-list of the downstream store. Containers are always accepted; only
//! their leaves are checked.

use checker_core::{Field, Schema, Violation};
use tracing::debug;

/// Canonical type tags accepted by the downstream store.
pub const ALLOWED_TYPES: &[&str] = &[
    "UINT8",
    "UINT16",
    "UINT32",
    "UINT64",
    "INT8",
    "INT16",
    "INT32",
    "INT64",
    "STRING",
    "LIST",
    "STRUCT",
    "MAP",
    "BOOL",
    "FLOAT",
    "DOUBLE",
    "BINARY",
    "DECIMAL128",
    "DATE32",
    "TIMESTAMP",
    "TIME32",
    "TIME64",
    "NA",
];

/// Returns true if the canonical form of `tag` is on the allow-list.
pub fn is_allowed(tag: &str) -> bool {
    let canonical = checker_core::canonical_tag(tag);
    ALLOWED_TYPES.contains(&canonical.as_str())
}

/// Validates column types against the allow-list.
///
/// The walk is pure: it returns violations in depth-first schema order and
/// prints nothing.
pub struct TypeValidator;

impl TypeValidator {
    /// Creates a new type validator.
    pub fn new() -> Self {
        Self
    }

    /// Validates every field of a schema.
    ///
    /// Returns a list of violations. An empty list indicates success; an
    /// empty schema yields an empty list.
    pub fn validate(&self, schema: &Schema) -> Vec<Violation> {
        let violations = self.validate_fields(&schema.fields);
        debug!(
            "Type check found {} violation(s) in {} top-level field(s)",
            violations.len(),
            schema.len()
        );
        violations
    }

    /// Validates a sequence of top-level fields.
    pub fn validate_fields(&self, fields: &[Field]) -> Vec<Violation> {
        let mut violations = Vec::new();
        for field in fields {
            self.walk(field, None, &mut violations);
        }
        violations
    }

    fn walk(&self, field: &Field, parent: Option<&str>, violations: &mut Vec<Violation>) {
        let path = match parent {
            Some(parent) => format!("{}.{}", parent, field.name),
            None => field.name.clone(),
        };

        if field.is_container() {
            for child in &field.children {
                self.walk(child, Some(&path), violations);
            }
            return;
        }

        if !is_allowed(field.data_type.declared()) {
            violations.push(Violation::new(path, field.data_type.declared()));
        }
    }
}

impl Default for TypeValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checker_core::{FieldBuilder, SchemaBuilder};
    use pretty_assertions::assert_eq;

    fn schema(fields: Vec<Field>) -> Schema {
        SchemaBuilder::new("test.parquet").fields(fields).build()
    }

    #[test]
    fn test_supported_schema() {
        let schema = schema(vec![
            FieldBuilder::new("a", "INT32").build(),
            FieldBuilder::new("b", "STRING").build(),
            FieldBuilder::new("c", "LIST")
                .child(FieldBuilder::new("item", "INT32").build())
                .build(),
        ]);

        let violations = TypeValidator::new().validate(&schema);
        assert!(violations.is_empty(), "unexpected: {:?}", violations);
    }

    #[test]
    fn test_unsupported_leaf() {
        let schema = schema(vec![FieldBuilder::new("x", "INTERVAL").build()]);

        let violations = TypeValidator::new().validate(&schema);
        assert_eq!(violations, vec![Violation::new("x", "INTERVAL")]);
    }

    #[test]
    fn test_parameterised_tags_are_allowed() {
        let schema = schema(vec![
            FieldBuilder::new("amount", "DECIMAL128(10,2)").build(),
            FieldBuilder::new("ts", "TIMESTAMP[us]").build(),
            FieldBuilder::new("ts_tz", "TIMESTAMP[us, tz=UTC]").build(),
            FieldBuilder::new("day", "DATE32[day]").build(),
            FieldBuilder::new("t", "TIME64[ns]").build(),
        ]);

        assert!(TypeValidator::new().validate(&schema).is_empty());
    }

    #[test]
    fn test_nested_path() {
        let schema = schema(vec![
            FieldBuilder::new("root", "STRUCT")
                .child(FieldBuilder::new("inner", "INTERVAL").build())
                .build(),
        ]);

        let violations = TypeValidator::new().validate(&schema);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "root.inner");
        assert_eq!(violations[0].data_type, "INTERVAL");
    }

    #[test]
    fn test_deeply_nested_path_uses_child_names() {
        let schema = schema(vec![
            FieldBuilder::new("events", "LIST")
                .child(
                    FieldBuilder::new("item", "STRUCT")
                        .child(FieldBuilder::new("id", "INT64").build())
                        .child(FieldBuilder::new("amount", "DECIMAL256(40, 2)").build())
                        .build(),
                )
                .build(),
        ]);

        let violations = TypeValidator::new().validate(&schema);
        assert_eq!(
            violations,
            vec![Violation::new("events.item.amount", "DECIMAL256(40, 2)")]
        );
    }

    #[test]
    fn test_containers_never_flagged() {
        let schema = schema(vec![
            FieldBuilder::new("wide", "LARGE_LIST")
                .child(FieldBuilder::new("item", "STRING").build())
                .build(),
            FieldBuilder::new("empty", "STRUCT").build(),
        ]);

        assert!(TypeValidator::new().validate(&schema).is_empty());
    }

    #[test]
    fn test_original_tag_is_reported() {
        let schema = schema(vec![
            FieldBuilder::new("d", "DATE64[ms]").build(),
            FieldBuilder::new("big", "LARGE_STRING").build(),
        ]);

        let violations = TypeValidator::new().validate(&schema);
        assert_eq!(
            violations,
            vec![
                Violation::new("d", "DATE64[ms]"),
                Violation::new("big", "LARGE_STRING"),
            ]
        );
    }

    #[test]
    fn test_violation_order_follows_schema() {
        let schema = schema(vec![
            FieldBuilder::new("z", "HALFFLOAT").build(),
            FieldBuilder::new("m", "MAP")
                .child(
                    FieldBuilder::new("entries", "STRUCT")
                        .child(FieldBuilder::new("key", "STRING").build())
                        .child(FieldBuilder::new("value", "DURATION[s]").build())
                        .build(),
                )
                .build(),
            FieldBuilder::new("a", "INTERVAL").build(),
        ]);

        let paths: Vec<_> = TypeValidator::new()
            .validate(&schema)
            .into_iter()
            .map(|v| v.path)
            .collect();
        assert_eq!(paths, vec!["z", "m.entries.value", "a"]);
    }

    #[test]
    fn test_empty_schema() {
        let schema = schema(vec![]);
        assert!(TypeValidator::new().validate(&schema).is_empty());
    }

    #[test]
    fn test_lowercase_tags_are_canonicalized() {
        assert!(is_allowed("int32"));
        assert!(is_allowed("decimal128(38, 9)"));
        assert!(!is_allowed("decimal256(38, 9)"));
        assert!(!is_allowed(""));
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let schema = schema(vec![
            FieldBuilder::new("x", "INTERVAL").build(),
            FieldBuilder::new("y", "INT8").build(),
        ]);
        let validator = TypeValidator::new();
        assert_eq!(validator.validate(&schema), validator.validate(&schema));
    }
}
