use tracing::{trace, warn};

use crate::error::CompareError;
use crate::path::{last_key, PathSegment, ROOT_PATH};
use crate::types::{DiffNode, FieldType, Status};
use crate::value::DiffValue;

use super::node::{error_node, ignored, leaf, screen};
use super::{array, object, primitive, ComparisonContext};

/// Compare two values at `path`
///
/// Steps, in order: count the comparison, honour ignore rules, take the
/// scalar fast path, settle absent/empty sides and type changes, then
/// dispatch to the object, array or primitive comparator. A failure while
/// comparing the node turns it into an error leaf and is recorded; it never
/// aborts the rest of the tree.
///
/// Called with [`ROOT_PATH`] outside any container, the node is the tree
/// root: ignore rules do not apply to it and its children get bare paths.
/// Any other path is compared as a subtree rooted at that path.
pub fn compare_nodes(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    ctx: &mut ComparisonContext<'_>,
) -> DiffNode {
    if path == ROOT_PATH && ctx.depth() == 0 {
        ctx.stats.record_comparison();
        let key = PathSegment::Key(ROOT_PATH.to_string());
        return contain(old, new, path, key, true, ctx);
    }
    compare_at(old, new, path, last_key(path), ctx)
}

/// [`compare_nodes`] for a child, with its key already known
pub(crate) fn compare_at(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: PathSegment,
    ctx: &mut ComparisonContext<'_>,
) -> DiffNode {
    ctx.stats.record_comparison();

    if ctx.ignore.matches_node(path, &key) {
        trace!(path, "ignored");
        return ignored(path, key, old, new, ctx);
    }

    contain(old, new, path, key, false, ctx)
}

fn contain(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: PathSegment,
    is_root: bool,
    ctx: &mut ComparisonContext<'_>,
) -> DiffNode {
    match route(old, new, path, &key, is_root, ctx) {
        Ok(node) => node,
        Err(err) => {
            warn!(path, error = %err, "node comparison failed");
            ctx.stats
                .record_error("COMPARISON_ERROR", err.to_string(), path);
            let stack = ctx.trace(path);
            error_node(path, key, &err, stack)
        }
    }
}

fn route(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: &PathSegment,
    is_root: bool,
    ctx: &mut ComparisonContext<'_>,
) -> Result<DiffNode, CompareError> {
    if !old.is_complex() && !new.is_complex() && old == new {
        return Ok(leaf(
            path,
            key.clone(),
            Status::Unchanged,
            FieldType::from(old.value_type()),
            old,
            new,
            ctx,
        ));
    }

    if let Some(node) = screen(old, new, path, key, ctx) {
        return Ok(node);
    }

    let parent = (!is_root).then_some(path);
    match old {
        DiffValue::Object(_) => ctx.nested(parent, |ctx| {
            object::compare_objects(old, new, path, key.clone(), ctx)
        }),
        DiffValue::Array(_) => ctx.nested(parent, |ctx| {
            array::compare_arrays(old, new, path, key.clone(), ctx)
        }),
        _ => Ok(primitive::compare_primitives(old, new, path, key.clone(), ctx)),
    }
}
