//! Type conversion between Arrow and checker types.

use arrow_schema::{DataType, Field as ArrowField, IntervalUnit, TimeUnit, UnionMode};
use checker_core::{Field, FieldBuilder, SizeCategory};
use tracing::debug;

/// Converts an Arrow field, and any nested children, to a checker field.
pub fn convert_arrow_field(field: &ArrowField) -> Field {
    let data_type = field.data_type();
    let tag = arrow_type_tag(data_type);
    let category = size_category(data_type);

    debug!(
        "Converting field: {} (Arrow type: {} -> tag: {}, category: {})",
        field.name(),
        data_type,
        tag,
        category
    );

    child_fields(data_type).into_iter().fold(
        FieldBuilder::new(field.name(), tag)
            .nullable(field.is_nullable())
            .category(category),
        |builder, child| builder.child(convert_arrow_field(child)),
    )
    .build()
}

/// Returns the direct children of a container type, in declaration order.
fn child_fields(data_type: &DataType) -> Vec<&ArrowField> {
    match data_type {
        DataType::List(item)
        | DataType::LargeList(item)
        | DataType::ListView(item)
        | DataType::LargeListView(item)
        | DataType::FixedSizeList(item, _) => vec![&**item],
        DataType::Struct(fields) => fields.iter().map(|f| &**f).collect(),
        DataType::Map(entries, _) => vec![&**entries],
        _ => Vec::new(),
    }
}

/// Renders an Arrow type as a declared type tag.
///
/// The tag is uppercase; parameters follow in `(...)`, `[...]` or `<...>`,
/// e.g. `DECIMAL128(10, 2)`, `TIMESTAMP[us, tz=UTC]`.
pub fn arrow_type_tag(data_type: &DataType) -> String {
    match data_type {
        DataType::Null => "NA".to_string(),
        DataType::Boolean => "BOOL".to_string(),
        DataType::Int8 => "INT8".to_string(),
        DataType::Int16 => "INT16".to_string(),
        DataType::Int32 => "INT32".to_string(),
        DataType::Int64 => "INT64".to_string(),
        DataType::UInt8 => "UINT8".to_string(),
        DataType::UInt16 => "UINT16".to_string(),
        DataType::UInt32 => "UINT32".to_string(),
        DataType::UInt64 => "UINT64".to_string(),
        DataType::Float16 => "HALFFLOAT".to_string(),
        DataType::Float32 => "FLOAT".to_string(),
        DataType::Float64 => "DOUBLE".to_string(),
        DataType::Utf8 => "STRING".to_string(),
        DataType::LargeUtf8 => "LARGE_STRING".to_string(),
        DataType::Utf8View => "STRING_VIEW".to_string(),
        DataType::Binary => "BINARY".to_string(),
        DataType::LargeBinary => "LARGE_BINARY".to_string(),
        DataType::BinaryView => "BINARY_VIEW".to_string(),
        DataType::FixedSizeBinary(width) => format!("FIXED_SIZE_BINARY[{}]", width),
        DataType::Decimal32(p, s) => format!("DECIMAL32({}, {})", p, s),
        DataType::Decimal64(p, s) => format!("DECIMAL64({}, {})", p, s),
        DataType::Decimal128(p, s) => format!("DECIMAL128({}, {})", p, s),
        DataType::Decimal256(p, s) => format!("DECIMAL256({}, {})", p, s),
        DataType::Date32 => "DATE32[day]".to_string(),
        DataType::Date64 => "DATE64[ms]".to_string(),
        DataType::Timestamp(unit, None) => format!("TIMESTAMP[{}]", time_unit(unit)),
        DataType::Timestamp(unit, Some(tz)) => {
            format!("TIMESTAMP[{}, tz={}]", time_unit(unit), tz)
        }
        DataType::Time32(unit) => format!("TIME32[{}]", time_unit(unit)),
        DataType::Time64(unit) => format!("TIME64[{}]", time_unit(unit)),
        DataType::Duration(unit) => format!("DURATION[{}]", time_unit(unit)),
        DataType::Interval(unit) => format!("INTERVAL[{}]", interval_unit(unit)),
        DataType::List(_) => "LIST".to_string(),
        DataType::LargeList(_) => "LARGE_LIST".to_string(),
        DataType::ListView(_) => "LIST_VIEW".to_string(),
        DataType::LargeListView(_) => "LARGE_LIST_VIEW".to_string(),
        DataType::FixedSizeList(_, size) => format!("FIXED_SIZE_LIST[{}]", size),
        DataType::Struct(_) => "STRUCT".to_string(),
        DataType::Map(_, _) => "MAP".to_string(),
        DataType::Dictionary(keys, values) => format!(
            "DICTIONARY<values={}, indices={}>",
            arrow_type_tag(values),
            arrow_type_tag(keys)
        ),
        DataType::Union(_, UnionMode::Dense) => "DENSE_UNION".to_string(),
        DataType::Union(_, UnionMode::Sparse) => "SPARSE_UNION".to_string(),
        DataType::RunEndEncoded(_, _) => "RUN_END_ENCODED".to_string(),
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other).to_uppercase(),
    }
}

fn time_unit(unit: &TimeUnit) -> &'static str {
    match unit {
        TimeUnit::Second => "s",
        TimeUnit::Millisecond => "ms",
        TimeUnit::Microsecond => "us",
        TimeUnit::Nanosecond => "ns",
    }
}

fn interval_unit(unit: &IntervalUnit) -> &'static str {
    match unit {
        IntervalUnit::YearMonth => "year_month",
        IntervalUnit::DayTime => "day_time",
        IntervalUnit::MonthDayNano => "month_day_nano",
    }
}

/// Assigns the size category of an Arrow type.
///
/// Dictionary-encoded columns are sized by their values. Types whose values
/// are defined by children (lists, structs, maps, unions, run-end encoded)
/// are containers.
pub fn size_category(data_type: &DataType) -> SizeCategory {
    match data_type {
        DataType::Boolean => SizeCategory::Bool,
        DataType::Null => SizeCategory::FixedWidth { width: 0 },
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => SizeCategory::Utf8,
        DataType::Binary | DataType::LargeBinary | DataType::BinaryView => SizeCategory::Binary,
        DataType::FixedSizeBinary(width) => SizeCategory::FixedWidth {
            width: (*width).max(0) as usize,
        },
        DataType::Dictionary(_, values) => size_category(values),
        other => other
            .primitive_width()
            .map(|width| SizeCategory::FixedWidth { width })
            .unwrap_or(SizeCategory::Container),
    }
}
