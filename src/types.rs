use crate::path::PathSegment;
use crate::value::ValueType;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Classification of change at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Unchanged,
    Modified,
    Added,
    Deleted,
    Ignored,
}

impl Status {
    /// Propagation priority: ignored < unchanged < deleted = added < modified
    pub fn priority(&self) -> u8 {
        match self {
            Status::Ignored => 0,
            Status::Unchanged => 1,
            Status::Deleted | Status::Added => 2,
            Status::Modified => 3,
        }
    }

    /// Anything other than unchanged or ignored
    pub fn is_change(&self) -> bool {
        !matches!(self, Status::Unchanged | Status::Ignored)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unchanged => "unchanged",
            Status::Modified => "modified",
            Status::Added => "added",
            Status::Deleted => "deleted",
            Status::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type reported on a node: a value type, or one of the synthetic tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Null,
    Undefined,
    Boolean,
    Number,
    String,
    Date,
    Regexp,
    Array,
    Object,
    /// The value changed type between the two sides
    Mixed,
    Unknown,
    /// Comparison of this node failed
    Error,
    /// Summary of the unsampled tail of a large array
    Ellipsis,
}

impl FieldType {
    /// Object and array nodes are the only ones that may carry children
    pub fn is_container(&self) -> bool {
        matches!(self, FieldType::Array | FieldType::Object)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Null => "null",
            FieldType::Undefined => "undefined",
            FieldType::Boolean => "boolean",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Regexp => "regexp",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Mixed => "mixed",
            FieldType::Unknown => "unknown",
            FieldType::Error => "error",
            FieldType::Ellipsis => "ellipsis",
        }
    }
}

impl From<ValueType> for FieldType {
    fn from(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Null => FieldType::Null,
            ValueType::Undefined => FieldType::Undefined,
            ValueType::Boolean => FieldType::Boolean,
            ValueType::Number => FieldType::Number,
            ValueType::String => FieldType::String,
            ValueType::Date => FieldType::Date,
            ValueType::Regexp => FieldType::Regexp,
            ValueType::Array => FieldType::Array,
            ValueType::Object => FieldType::Object,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure attached to an error node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeError {
    pub message: String,
    /// Paths of the enclosing comparisons, innermost first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    #[serde(rename = "type")]
    pub error_type: String,
}

/// One entry of the difference tree
#[derive(Debug, Clone, PartialEq)]
pub struct DiffNode {
    pub path: String,
    pub status: Status,
    pub field_type: FieldType,
    pub key: PathSegment,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    /// Present only on object and array nodes
    pub children: Option<Vec<DiffNode>>,
    pub error: Option<NodeError>,
}

impl DiffNode {
    /// True when the node has no `children` field at all
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Children in key-union order; empty for leaves
    pub fn children(&self) -> &[DiffNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// Look up a direct child by its display key (`name` or `[i]`)
    pub fn child(&self, key: &str) -> Option<&DiffNode> {
        self.children()
            .iter()
            .find(|child| child.key.to_string() == key)
    }

    /// Find a node anywhere in this subtree by its full path
    pub fn find(&self, path: &str) -> Option<&DiffNode> {
        self.walk().find(|node| node.path == path)
    }

    /// Pre-order traversal of this node and all descendants
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree, see [`DiffNode::walk`]
pub struct Walk<'a> {
    stack: Vec<&'a DiffNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a DiffNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Children serialize as an ordered object keyed by `name` / `[i]`
struct ChildrenMap<'a>(&'a [DiffNode]);

impl Serialize for ChildrenMap<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.0.iter().map(|child| (child.key.to_string(), child)))
    }
}

impl Serialize for DiffNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("status", &self.status)?;
        map.serialize_entry("fieldType", &self.field_type)?;
        map.serialize_entry("key", &self.key)?;
        if let Some(old_value) = &self.old_value {
            map.serialize_entry("oldValue", old_value)?;
        }
        if let Some(new_value) = &self.new_value {
            map.serialize_entry("newValue", new_value)?;
        }
        if let Some(children) = &self.children {
            map.serialize_entry("children", &ChildrenMap(children))?;
        }
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.end()
    }
}

/// Timestamps in the envelope are ISO 8601 with milliseconds
fn serialize_timestamp<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// An error or warning recorded while building the tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub path: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Diagnostic {
    pub fn new(kind: impl Into<String>, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            path: path.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Node counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub unchanged: usize,
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub ignored: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub version: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Milliseconds
    pub processing_time: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub has_errors: bool,
    pub has_warnings: bool,
}

impl Diagnostics {
    pub fn new(errors: Vec<Diagnostic>, warnings: Vec<Diagnostic>) -> Self {
        Self {
            has_errors: !errors.is_empty(),
            has_warnings: !warnings.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Result envelope of one diff call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffResult {
    pub success: bool,
    /// `None` (serialized as `null`) only on fatal failure
    pub tree: Option<DiffNode>,
    pub statistics: Statistics,
    pub metadata: Metadata,
    pub diagnostics: Diagnostics,
}

impl DiffResult {
    /// Status of the root node, if a tree was produced
    pub fn root_status(&self) -> Option<Status> {
        self.tree.as_ref().map(|tree| tree.status)
    }

    /// Look up a node by path in the produced tree
    pub fn node(&self, path: &str) -> Option<&DiffNode> {
        self.tree.as_ref().and_then(|tree| tree.find(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf(path: &str, key: PathSegment, status: Status) -> DiffNode {
        DiffNode {
            path: path.to_string(),
            status,
            field_type: FieldType::Number,
            key,
            old_value: Some(json!(1)),
            new_value: Some(json!(2)),
            children: None,
            error: None,
        }
    }

    fn sample_tree() -> DiffNode {
        DiffNode {
            path: "root".to_string(),
            status: Status::Modified,
            field_type: FieldType::Object,
            key: PathSegment::Key("root".to_string()),
            old_value: None,
            new_value: None,
            children: Some(vec![
                leaf("b", PathSegment::Key("b".to_string()), Status::Modified),
                DiffNode {
                    path: "a".to_string(),
                    status: Status::Unchanged,
                    field_type: FieldType::Array,
                    key: PathSegment::Key("a".to_string()),
                    old_value: None,
                    new_value: None,
                    children: Some(vec![leaf("a[0]", PathSegment::Index(0), Status::Unchanged)]),
                    error: None,
                },
            ]),
            error: None,
        }
    }

    #[test]
    fn test_status_priority_order() {
        assert!(Status::Ignored.priority() < Status::Unchanged.priority());
        assert!(Status::Unchanged.priority() < Status::Added.priority());
        assert_eq!(Status::Added.priority(), Status::Deleted.priority());
        assert!(Status::Deleted.priority() < Status::Modified.priority());
    }

    #[test]
    fn test_serialize_node_shape() {
        let value = serde_json::to_value(sample_tree()).unwrap();

        assert_eq!(value["fieldType"], "object");
        assert_eq!(value["key"], "root");
        assert!(value.get("oldValue").is_none());
        assert_eq!(value["children"]["b"]["status"], "modified");
        assert_eq!(value["children"]["a"]["children"]["[0]"]["key"], 0);
        assert!(value["children"]["b"].get("children").is_none());

        let keys: Vec<&String> = value["children"].as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = sample_tree();
        let paths: Vec<&str> = tree.walk().map(|n| n.path.as_str()).collect();
        assert_eq!(paths, vec!["root", "b", "a", "a[0]"]);
    }

    #[test]
    fn test_child_and_find() {
        let tree = sample_tree();
        assert_eq!(tree.child("b").unwrap().path, "b");
        assert!(tree.child("missing").is_none());
        assert_eq!(tree.find("a[0]").unwrap().key, PathSegment::Index(0));
        assert!(tree.find("a").unwrap().child("[0]").unwrap().is_leaf());
    }

    #[test]
    fn test_diagnostic_serializes_type() {
        let diagnostic = Diagnostic::new("PROCESSING_ERROR", "boom", "root");
        let value = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(value["type"], "PROCESSING_ERROR");
        assert_eq!(value["path"], "root");
        assert!(value["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
