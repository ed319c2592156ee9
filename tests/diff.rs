//! Integration tests for diff tree generation

use std::collections::HashSet;
use std::thread;

use difftree::{
    diff, generate_diff_tree, ArrayOptimization, DiffConfig, DiffEngine, DiffOptions, DiffRequest,
    DiffValue, FieldType, IgnoreRules, Statistics, Status, StringComparison, DEFAULT_MAX_DEPTH,
};
use serde_json::{json, Value};

fn run(old: Value, new: Value) -> difftree::DiffResult {
    diff(&old, &new, &[], &DiffOptions::default()).unwrap()
}

fn run_with(old: Value, new: Value, options: DiffOptions) -> difftree::DiffResult {
    diff(&old, &new, &[], &options).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let result = run(
        json!({"name": "J", "age": 30}),
        json!({"name": "J", "age": 31, "email": "j@x.com"}),
    );

    assert!(result.success);
    let tree = result.tree.as_ref().unwrap();
    assert_eq!(tree.status, Status::Modified);
    assert_eq!(tree.path, "root");
    assert_eq!(tree.field_type, FieldType::Object);

    let name = tree.child("name").unwrap();
    assert_eq!(name.status, Status::Unchanged);

    let age = tree.child("age").unwrap();
    assert_eq!(age.status, Status::Modified);
    assert_eq!(age.old_value, Some(json!(30)));
    assert_eq!(age.new_value, Some(json!(31)));

    let email = tree.child("email").unwrap();
    assert_eq!(email.status, Status::Added);
    assert_eq!(email.old_value, Some(Value::Null));
    assert_eq!(email.new_value, Some(json!("j@x.com")));

    // The root counts itself
    assert_eq!(
        result.statistics,
        Statistics {
            total: 4,
            unchanged: 1,
            modified: 2,
            added: 1,
            deleted: 0,
            ignored: 0,
        }
    );
}

#[test]
fn test_identical_inputs_are_unchanged() {
    let value = json!({
        "user": {"name": "Ann", "tags": ["a", "b"], "meta": null},
        "items": [{"id": 1}, {"id": 2}],
        "flag": true
    });
    let result = run(value.clone(), value);

    assert_eq!(result.root_status(), Some(Status::Unchanged));
    assert_eq!(result.statistics.modified, 0);
    assert_eq!(result.statistics.added, 0);
    assert_eq!(result.statistics.deleted, 0);
}

#[test]
fn test_added_and_deleted_roots() {
    let value = DiffValue::from(json!({"a": [1, 2]}));
    let mut engine = DiffEngine::new(DiffConfig::default(), IgnoreRules::default());

    let added = engine.generate_diff_tree(&DiffValue::Undefined, &value);
    assert_eq!(added.root_status(), Some(Status::Added));
    assert_eq!(added.tree.as_ref().unwrap().new_value, Some(json!(r#"{"a":[1,2]}"#)));

    let deleted = engine.generate_diff_tree(&value, &DiffValue::Undefined);
    assert_eq!(deleted.root_status(), Some(Status::Deleted));
    assert_eq!(deleted.tree.as_ref().unwrap().old_value, Some(json!(r#"{"a":[1,2]}"#)));
}

#[test]
fn test_ignore_suppresses_change() {
    let result = diff(
        &json!({"a": 1, "b": 1}),
        &json!({"a": 1, "b": 2}),
        &["b".to_string()],
        &DiffOptions::default(),
    )
    .unwrap();

    assert_eq!(result.root_status(), Some(Status::Unchanged));
    assert_eq!(result.node("b").unwrap().status, Status::Ignored);
    assert_eq!(result.statistics.ignored, 1);
    assert_eq!(result.statistics.modified, 0);
}

#[test]
fn test_ignore_glob_pattern() {
    let result = diff(
        &json!({"items": [{"id": 1, "ts": 100}, {"id": 2, "ts": 200}]}),
        &json!({"items": [{"id": 1, "ts": 101}, {"id": 2, "ts": 201}]}),
        &["items[*].ts".to_string()],
        &DiffOptions::default(),
    )
    .unwrap();

    assert_eq!(result.root_status(), Some(Status::Unchanged));
    assert_eq!(result.node("items[0].ts").unwrap().status, Status::Ignored);
    assert_eq!(result.node("items[1].ts").unwrap().status, Status::Ignored);
    assert_eq!(result.statistics.ignored, 2);
}

#[test]
fn test_type_change_is_mixed() {
    let result = run(json!({"x": "5"}), json!({"x": 5}));
    let x = result.node("x").unwrap();
    assert_eq!(x.status, Status::Modified);
    assert_eq!(x.field_type, FieldType::Mixed);
}

#[test]
fn test_array_positional_semantics() {
    let shorter = run(json!([1, 2, 3]), json!([1, 2]));
    assert_eq!(shorter.root_status(), Some(Status::Modified));
    assert_eq!(shorter.node("[2]").unwrap().status, Status::Deleted);
    assert_eq!(shorter.node("[0]").unwrap().status, Status::Unchanged);

    let longer = run(json!([1, 2]), json!([1, 2, 3]));
    assert_eq!(longer.root_status(), Some(Status::Modified));
    assert_eq!(longer.node("[2]").unwrap().status, Status::Added);
}

#[test]
fn test_nested_change_surfaces_at_every_ancestor() {
    let result = run(
        json!({"a": {"b": {"c": [1, {"d": 1}]}}}),
        json!({"a": {"b": {"c": [1, {"d": 2}]}}}),
    );

    for path in ["root", "a", "a.b", "a.b.c", "a.b.c[1]", "a.b.c[1].d"] {
        assert_eq!(result.node(path).unwrap().status, Status::Modified, "{}", path);
    }
    assert_eq!(result.node("a.b.c[0]").unwrap().status, Status::Unchanged);
}

#[test]
fn test_string_comparison_modes() {
    let normalized = run(json!("a  b"), json!("a b"));
    assert_eq!(normalized.root_status(), Some(Status::Unchanged));

    let strict = run_with(
        json!("a  b"),
        json!("a b"),
        DiffOptions {
            string_comparison: Some(StringComparison::Strict),
            ..Default::default()
        },
    );
    assert_eq!(strict.root_status(), Some(Status::Modified));

    let case_insensitive = run_with(
        json!("Hello"),
        json!("hello"),
        DiffOptions {
            string_comparison: Some(StringComparison::CaseInsensitive),
            ..Default::default()
        },
    );
    assert_eq!(case_insensitive.root_status(), Some(Status::Unchanged));
}

#[test]
fn test_number_precision() {
    let precise = run_with(
        json!(1.001),
        json!(1.002),
        DiffOptions {
            number_precision: Some(2),
            ..Default::default()
        },
    );
    assert_eq!(precise.root_status(), Some(Status::Unchanged));

    let exact = run(json!(1.001), json!(1.002));
    assert_eq!(exact.root_status(), Some(Status::Modified));
}

#[test]
fn test_dates_and_regexps() {
    let result = run(
        json!({"at": {"$date": "2024-01-01T00:00:00Z"}, "re": {"$regex": "^a", "$options": "i"}}),
        json!({"at": {"$date": 1704067200000i64}, "re": {"$regex": "^a", "$options": "g"}}),
    );

    let at = result.node("at").unwrap();
    assert_eq!(at.field_type, FieldType::Date);
    assert_eq!(at.status, Status::Unchanged);

    let re = result.node("re").unwrap();
    assert_eq!(re.field_type, FieldType::Regexp);
    assert_eq!(re.status, Status::Modified);
}

#[test]
fn test_large_array_is_sampled() {
    let old: Vec<u32> = (0..50).collect();
    let mut new = old.clone();
    new[40] = 999;

    let result = run_with(
        json!(old),
        json!(new),
        DiffOptions {
            max_array_size: Some(20),
            array_sample_size: Some(5),
            ..Default::default()
        },
    );
    let tree = result.tree.as_ref().unwrap();
    assert_eq!(tree.children().len(), 6);
    let ellipsis = tree.child("[...]").unwrap();
    assert_eq!(ellipsis.field_type, FieldType::Ellipsis);
    assert_eq!(ellipsis.status, Status::Unchanged);

    let deep = run_with(
        json!(old),
        json!(new),
        DiffOptions {
            max_array_size: Some(20),
            array_optimization: Some(ArrayOptimization::Deep),
            ..Default::default()
        },
    );
    assert_eq!(deep.root_status(), Some(Status::Modified));
    assert_eq!(deep.node("[40]").unwrap().status, Status::Modified);
}

#[test]
fn test_depth_limit_is_contained() {
    let result = run_with(
        json!({"a": {"b": {"c": 1}}}),
        json!({"a": {"b": {"c": 2}}}),
        DiffOptions {
            max_depth: Some(2),
            ..Default::default()
        },
    );

    assert!(result.success);
    assert!(result.diagnostics.has_errors);
    let failed = result.node("a.b").unwrap();
    assert_eq!(failed.field_type, FieldType::Error);
    assert_eq!(failed.status, Status::Modified);
    assert!(failed.error.is_some());
}

fn nested_objects(depth: usize, leaf: i64) -> Value {
    (0..depth).fold(json!(leaf), |inner, _| json!({"a": inner}))
}

#[test]
fn test_default_depth_limit_fits_a_default_thread_stack() {
    let run_on_thread = |depth: usize| {
        thread::spawn(move || {
            let result = run(nested_objects(depth, 1), nested_objects(depth, 2));
            (
                result.success,
                result.root_status(),
                result.diagnostics.errors.len(),
                result.statistics.total,
            )
        })
        .join()
        .unwrap()
    };

    let (success, status, errors, total) = run_on_thread(DEFAULT_MAX_DEPTH);
    assert!(success);
    assert_eq!(status, Some(Status::Modified));
    assert_eq!(errors, 0);
    assert_eq!(total, DEFAULT_MAX_DEPTH + 1);

    let (success, status, errors, total) = run_on_thread(DEFAULT_MAX_DEPTH + 1);
    assert!(success);
    assert_eq!(status, Some(Status::Modified));
    assert_eq!(errors, 1);
    assert_eq!(total, DEFAULT_MAX_DEPTH + 1);
}

#[test]
fn test_field_named_root_keeps_unique_paths() {
    let result = run(
        json!({"root": {"a": 1}, "a": 1}),
        json!({"root": {"a": 2}, "a": 1}),
    );

    assert!(!result.diagnostics.has_warnings);
    let tree = result.tree.as_ref().unwrap();
    let paths: Vec<&str> = tree.walk().map(|node| node.path.as_str()).collect();
    assert_eq!(paths, vec!["root", "root", "root.a", "a"]);

    let field = tree.child("root").unwrap();
    assert_eq!(field.status, Status::Modified);
    assert_eq!(field.children()[0].path, "root.a");
    assert_eq!(tree.child("a").unwrap().status, Status::Unchanged);

    let empty_key = run(json!({"": {"a": 1}, "a": 1}), json!({"": {"a": 2}, "a": 1}));
    let paths: HashSet<String> = empty_key
        .tree
        .as_ref()
        .unwrap()
        .walk()
        .map(|node| node.path.clone())
        .collect();
    assert_eq!(paths.len(), 4);
    assert!(paths.contains(".a"));
}

#[test]
fn test_ignoring_a_field_named_root_keeps_other_changes() {
    let result = diff(
        &json!({"root": 1, "b": 1}),
        &json!({"root": 1, "b": 2}),
        &["root".to_string()],
        &DiffOptions::default(),
    )
    .unwrap();

    let tree = result.tree.as_ref().unwrap();
    assert_eq!(tree.status, Status::Modified);
    assert_eq!(tree.child("root").unwrap().status, Status::Ignored);
    assert_eq!(tree.child("b").unwrap().status, Status::Modified);
    assert_eq!(result.statistics.ignored, 1);
}

#[test]
fn test_omit_unchanged_values() {
    let result = run_with(
        json!({"a": 1, "b": 2}),
        json!({"a": 1, "b": 3}),
        DiffOptions {
            include_unchanged: Some(false),
            ..Default::default()
        },
    );

    let a = result.node("a").unwrap();
    assert_eq!(a.old_value, None);
    assert_eq!(a.new_value, None);
    assert_eq!(result.node("b").unwrap().new_value, Some(json!(3)));
}

#[test]
fn test_request_from_json() {
    let request = DiffRequest::from_json(&json!({
        "oldData": {"a": 1, "b": 1},
        "newData": {"a": 1, "b": 2},
        "ignoreFields": ["b"],
        "options": {"stringComparison": "strict"}
    }))
    .unwrap();
    let result = generate_diff_tree(&request);

    assert!(result.success);
    assert_eq!(result.root_status(), Some(Status::Unchanged));
}

#[test]
fn test_invalid_config_yields_failure_envelope() {
    let config = DiffConfig {
        max_string_length: 0,
        ..Default::default()
    };
    let mut engine = DiffEngine::new(config, IgnoreRules::default());
    let result = engine.generate_diff_tree(&DiffValue::from(json!(1)), &DiffValue::from(json!(2)));

    assert!(!result.success);
    assert!(result.tree.is_none());
    assert_eq!(result.statistics, Statistics::default());
    assert!(result.diagnostics.has_errors);
    assert!(result
        .diagnostics
        .errors
        .iter()
        .any(|e| e.kind == "PROCESSING_ERROR" && e.path == "root"));
}

#[test]
fn test_envelope_shape() {
    let result = run(json!({"a": 1}), json!({"a": 1}));
    let value = serde_json::to_value(&result).unwrap();

    for field in ["success", "tree", "statistics", "metadata", "diagnostics"] {
        assert!(value.get(field).is_some(), "missing {}", field);
    }
    assert_eq!(value["tree"]["key"], "root");
    assert_eq!(value["tree"]["children"]["a"]["path"], "a");
    assert!(value["metadata"]["timestamp"].is_string());
    assert!(value["metadata"]["processingTime"].is_u64());
    assert_eq!(value["diagnostics"]["hasWarnings"], false);
}
