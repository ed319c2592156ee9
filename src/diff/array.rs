use serde_json::Value;

use crate::config::ArrayOptimization;
use crate::path::PathSegment;
use crate::path::{build_index_path, build_path};
use crate::types::{DiffNode, FieldType, Status};
use crate::value::{DiffValue, UNDEFINED};

use super::node::{container, leaf, screen};
use super::router::compare_at;
use super::ComparisonContext;

/// Display key of the synthetic node summarising an unsampled tail
pub const ELLIPSIS_KEY: &str = "[...]";

/// Compare two arrays position by position
///
/// An index past the end of one array compares as absent there. In shallow
/// mode an array longer than `max_array_size` is sampled: only the first
/// `array_sample_size` positions are compared and a `[...]` child summarises
/// the rest.
pub fn compare_arrays(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: PathSegment,
    ctx: &mut ComparisonContext<'_>,
) -> DiffNode {
    if let Some(node) = screen(old, new, path, &key, ctx) {
        return node;
    }
    let (DiffValue::Array(old_items), DiffValue::Array(new_items)) = (old, new) else {
        return leaf(path, key, Status::Modified, FieldType::Mixed, old, new, ctx);
    };

    let max_len = old_items.len().max(new_items.len());
    let sampled = ctx.config.array_optimization == ArrayOptimization::Shallow
        && max_len > ctx.config.max_array_size;
    let compared = if sampled {
        max_len.min(ctx.config.array_sample_size)
    } else {
        max_len
    };

    let mut children = Vec::with_capacity(compared + 1);
    let mut has_changes = false;

    for index in 0..compared {
        let child = compare_at(
            old_items.get(index).unwrap_or(&UNDEFINED),
            new_items.get(index).unwrap_or(&UNDEFINED),
            &build_index_path(ctx.parent_path(), index),
            PathSegment::Index(index),
            ctx,
        );
        has_changes |= child.status.is_change();
        children.push(child);
    }

    if compared < max_len {
        let summary = ellipsis(ctx.parent_path(), old_items.len(), new_items.len(), compared);
        has_changes |= summary.status.is_change();
        children.push(summary);
    }

    let status = if has_changes {
        Status::Modified
    } else {
        Status::Unchanged
    };
    container(path, key, status, FieldType::Array, old, new, children, ctx)
}

/// Node standing for every position after the sample
///
/// It reports a change only when the lengths differ; the unsampled elements
/// themselves are not compared.
fn ellipsis(parent: Option<&str>, old_len: usize, new_len: usize, compared: usize) -> DiffNode {
    let remaining = |len: usize| Value::String(format!("... {} more items", len.saturating_sub(compared)));
    DiffNode {
        path: build_path(parent, "...", true),
        status: if old_len == new_len {
            Status::Unchanged
        } else {
            Status::Modified
        },
        field_type: FieldType::Ellipsis,
        key: PathSegment::Key(ELLIPSIS_KEY.to_string()),
        old_value: Some(remaining(old_len)),
        new_value: Some(remaining(new_len)),
        children: None,
        error: None,
    }
}
