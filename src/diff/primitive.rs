use crate::config::{DiffConfig, StringComparison};
use crate::path::PathSegment;
use crate::normalize::normalize_string;
use crate::types::{DiffNode, FieldType, Status};
use crate::value::DiffValue;

use super::node::{leaf, screen};
use super::ComparisonContext;

/// Compare two scalar values of the same type
pub fn compare_primitives(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: PathSegment,
    ctx: &mut ComparisonContext<'_>,
) -> DiffNode {
    if let Some(node) = screen(old, new, path, &key, ctx) {
        return node;
    }

    let status = if values_equal(old, new, ctx.config) {
        Status::Unchanged
    } else {
        Status::Modified
    };
    leaf(
        path,
        key,
        status,
        FieldType::from(old.value_type()),
        old,
        new,
        ctx,
    )
}

/// Equality of two scalars under the configured rules; containers are never equal here
pub fn values_equal(old: &DiffValue, new: &DiffValue, config: &DiffConfig) -> bool {
    match (old, new) {
        (DiffValue::String(a), DiffValue::String(b)) => {
            strings_equal(a, b, config.string_comparison)
        }
        (DiffValue::Number(a), DiffValue::Number(b)) => {
            numbers_equal(*a, *b, config.number_precision)
        }
        (DiffValue::Bool(a), DiffValue::Bool(b)) => a == b,
        (DiffValue::Date(a), DiffValue::Date(b)) => a.timestamp_millis() == b.timestamp_millis(),
        (
            DiffValue::Regexp {
                source: old_source,
                flags: old_flags,
            },
            DiffValue::Regexp {
                source: new_source,
                flags: new_flags,
            },
        ) => old_source == new_source && old_flags == new_flags,
        (DiffValue::Null, DiffValue::Null) | (DiffValue::Undefined, DiffValue::Undefined) => true,
        _ => false,
    }
}

fn strings_equal(a: &str, b: &str, mode: StringComparison) -> bool {
    match mode {
        StringComparison::Strict => a == b,
        StringComparison::Normalized => a == b || normalize_string(a) == normalize_string(b),
        StringComparison::CaseInsensitive => a.to_lowercase() == b.to_lowercase(),
    }
}

fn numbers_equal(a: f64, b: f64, precision: Option<u32>) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    if !a.is_finite() || !b.is_finite() {
        return a == b;
    }
    match precision {
        Some(p) => (a - b).abs() < 10f64.powi(-(p as i32)),
        None => a == b,
    }
}
