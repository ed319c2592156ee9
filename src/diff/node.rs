use crate::error::CompareError;
use crate::path::PathSegment;
use crate::normalize::{create_normalized_values, display_value};
use crate::types::{DiffNode, FieldType, NodeError, Status};
use crate::value::DiffValue;

use super::ComparisonContext;

/// Field type taken from the new side, or the old side when the new one is absent
pub(crate) fn field_type_of(old: &DiffValue, new: &DiffValue) -> FieldType {
    match new {
        DiffValue::Undefined => FieldType::from(old.value_type()),
        _ => FieldType::from(new.value_type()),
    }
}

/// Node without children
pub(crate) fn leaf(
    path: &str,
    key: PathSegment,
    status: Status,
    field_type: FieldType,
    old: &DiffValue,
    new: &DiffValue,
    ctx: &ComparisonContext<'_>,
) -> DiffNode {
    let max_len = ctx.config.max_string_length;
    let (old_side, new_side) = create_normalized_values(old, new, status);
    DiffNode {
        path: path.to_string(),
        status,
        field_type,
        key,
        old_value: old_side.map(|v| display_value(v, max_len)),
        new_value: new_side.map(|v| display_value(v, max_len)),
        children: None,
        error: None,
    }
}

/// Object or array node holding the comparison of its members
#[allow(clippy::too_many_arguments)]
pub(crate) fn container(
    path: &str,
    key: PathSegment,
    status: Status,
    field_type: FieldType,
    old: &DiffValue,
    new: &DiffValue,
    children: Vec<DiffNode>,
    ctx: &ComparisonContext<'_>,
) -> DiffNode {
    DiffNode {
        children: Some(children),
        ..leaf(path, key, status, field_type, old, new, ctx)
    }
}

pub(crate) fn ignored(
    path: &str,
    key: PathSegment,
    old: &DiffValue,
    new: &DiffValue,
    ctx: &ComparisonContext<'_>,
) -> DiffNode {
    leaf(path, key, Status::Ignored, field_type_of(old, new), old, new, ctx)
}

/// Leaf standing in for a node whose comparison failed
///
/// `stack` lists the containers that were open when it failed.
pub(crate) fn error_node(
    path: &str,
    key: PathSegment,
    err: &CompareError,
    stack: String,
) -> DiffNode {
    DiffNode {
        path: path.to_string(),
        status: Status::Modified,
        field_type: FieldType::Error,
        key,
        old_value: None,
        new_value: None,
        children: None,
        error: Some(NodeError {
            message: err.to_string(),
            stack: Some(stack),
            error_type: err.kind().to_string(),
        }),
    }
}

/// Handle the cases every comparator shares: absent or empty sides and a
/// change of type. `None` means both sides are present and of one type.
pub(crate) fn screen(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: &PathSegment,
    ctx: &ComparisonContext<'_>,
) -> Option<DiffNode> {
    let status = match (old.is_empty(), new.is_empty()) {
        (true, true) => Status::Unchanged,
        (true, false) => Status::Added,
        (false, true) => Status::Deleted,
        (false, false) if !old.is_same_type(new) => {
            return Some(leaf(
                path,
                key.clone(),
                Status::Modified,
                FieldType::Mixed,
                old,
                new,
                ctx,
            ));
        }
        (false, false) => return None,
    };
    Some(leaf(
        path,
        key.clone(),
        status,
        field_type_of(old, new),
        old,
        new,
        ctx,
    ))
}
