use std::collections::HashMap;

use crate::path::PathSegment;
use crate::path::build_path;
use crate::types::{DiffNode, FieldType, Status};
use crate::value::{DiffValue, UNDEFINED};

use super::node::{container, leaf, screen};
use super::router::compare_at;
use super::ComparisonContext;

/// Compare two objects key by key
///
/// Keys are visited in union order: the old object's keys as they appear,
/// then keys only the new object has. A key missing on one side compares as
/// absent. Ignored children do not count as changes.
pub fn compare_objects(
    old: &DiffValue,
    new: &DiffValue,
    path: &str,
    key: PathSegment,
    ctx: &mut ComparisonContext<'_>,
) -> DiffNode {
    if let Some(node) = screen(old, new, path, &key, ctx) {
        return node;
    }
    let (DiffValue::Object(old_entries), DiffValue::Object(new_entries)) = (old, new) else {
        return leaf(path, key, Status::Modified, FieldType::Mixed, old, new, ctx);
    };

    let old_index: HashMap<&str, &DiffValue> =
        old_entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
    let new_index: HashMap<&str, &DiffValue> =
        new_entries.iter().map(|(k, v)| (k.as_str(), v)).collect();

    let mut children = Vec::with_capacity(old_entries.len().max(new_entries.len()));
    let mut has_changes = false;

    let union = old_entries
        .iter()
        .map(|(k, v)| (k, v, new_index.get(k.as_str()).copied().unwrap_or(&UNDEFINED)))
        .chain(
            new_entries
                .iter()
                .filter(|(k, _)| !old_index.contains_key(k.as_str()))
                .map(|(k, v)| (k, &UNDEFINED, v)),
        );

    for (child_key, old_value, new_value) in union {
        let child_path = build_path(ctx.parent_path(), child_key, false);
        let child = compare_at(
            old_value,
            new_value,
            &child_path,
            PathSegment::Key(child_key.clone()),
            ctx,
        );
        has_changes |= child.status.is_change();
        children.push(child);
    }

    let status = if has_changes {
        Status::Modified
    } else {
        Status::Unchanged
    };
    container(path, key, status, FieldType::Object, old, new, children, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiffConfig;
    use crate::ignore::IgnoreRules;
    use crate::stats::StatisticsCollector;
    use serde_json::json;

    fn compare(old: serde_json::Value, new: serde_json::Value, ignore: &[&str]) -> DiffNode {
        let config = DiffConfig::default();
        let fields: Vec<String> = ignore.iter().map(|s| s.to_string()).collect();
        let rules = IgnoreRules::new(&fields).unwrap();
        let mut stats = StatisticsCollector::new();
        let mut ctx = ComparisonContext::new(&config, &rules, &mut stats);
        compare_objects(
            &DiffValue::from(old),
            &DiffValue::from(new),
            "root",
            PathSegment::Key("root".to_string()),
            &mut ctx,
        )
    }

    fn compare_tree(old: serde_json::Value, new: serde_json::Value) -> DiffNode {
        let config = DiffConfig::default();
        let rules = IgnoreRules::default();
        let mut stats = StatisticsCollector::new();
        let mut ctx = ComparisonContext::new(&config, &rules, &mut stats);
        super::super::compare_nodes(&DiffValue::from(old), &DiffValue::from(new), "root", &mut ctx)
    }

    #[test]
    fn test_key_union_order() {
        let node = compare(json!({"b": 1, "a": 2}), json!({"c": 3, "a": 2}), &[]);
        let keys: Vec<String> = node.children().iter().map(|c| c.key.to_string()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(node.child("b").unwrap().status, Status::Deleted);
        assert_eq!(node.child("a").unwrap().status, Status::Unchanged);
        assert_eq!(node.child("c").unwrap().status, Status::Added);
        assert_eq!(node.status, Status::Modified);
    }

    #[test]
    fn test_nested_paths() {
        let node = compare(json!({"user": {"name": "a"}}), json!({"user": {"name": "b"}}), &[]);
        let name = node.find("user.name").unwrap();
        assert_eq!(name.status, Status::Modified);
        assert_eq!(name.key, PathSegment::Key("name".to_string()));
    }

    #[test]
    fn test_keys_named_like_the_root_nest() {
        let node = compare_tree(
            json!({"root": {"a": 1}, "": {"a": 1}, "a": 1}),
            json!({"root": {"a": 2}, "": {"a": 2}, "a": 1}),
        );
        let field = node.child("root").unwrap();
        assert_eq!(field.path, "root");
        assert_eq!(field.children()[0].path, "root.a");
        assert_eq!(field.children()[0].status, Status::Modified);

        let empty = node.child("").unwrap();
        assert_eq!(empty.path, "");
        assert_eq!(empty.children()[0].path, ".a");
        assert_eq!(node.child("a").unwrap().path, "a");
    }

    #[test]
    fn test_ignored_child_is_not_a_change() {
        let node = compare(json!({"a": 1, "b": 1}), json!({"a": 1, "b": 2}), &["b"]);
        assert_eq!(node.status, Status::Unchanged);
        let b = node.child("b").unwrap();
        assert_eq!(b.status, Status::Ignored);
        assert_eq!(b.old_value, Some(json!(1)));
        assert_eq!(b.new_value, Some(json!(2)));
    }

    #[test]
    fn test_empty_objects_are_unchanged_containers() {
        let node = compare(json!({}), json!({}), &[]);
        assert_eq!(node.status, Status::Unchanged);
        assert_eq!(node.children.as_ref().map(Vec::len), Some(0));
    }

    #[test]
    fn test_non_object_input_is_mixed() {
        let node = compare(json!([1]), json!([2]), &[]);
        assert_eq!(node.field_type, FieldType::Mixed);
        assert!(node.is_leaf());
    }
}
