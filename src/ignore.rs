//! Field-ignore rules
//!
//! Three rule kinds are supported:
//! - exact paths (`user.updatedAt`)
//! - glob patterns, where `*` matches any run of characters (`items[*].id`)
//! - bare key names, matched against the last path segment only (`timestamp`)

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DiffTreeError;
use crate::path::{last_key, pointer_to_path, PathSegment};

/// Structured ignore configuration, as accepted from callers and ignore files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreSpec {
    pub exact: Vec<String>,
    pub patterns: Vec<String>,
    pub keys: Vec<String>,
}

impl IgnoreSpec {
    /// Split a flat list into exact paths and globs by the presence of `*`
    pub fn from_fields(fields: &[String]) -> Self {
        let (patterns, exact): (Vec<String>, Vec<String>) =
            fields.iter().cloned().partition(|f| f.contains('*'));
        Self {
            exact,
            patterns,
            keys: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty() && self.keys.is_empty()
    }

    pub fn extend(&mut self, other: IgnoreSpec) {
        self.exact.extend(other.exact);
        self.patterns.extend(other.patterns);
        self.keys.extend(other.keys);
    }
}

/// Compiled ignore rules, consulted for every compared path
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    exact: HashSet<String>,
    patterns: Vec<Regex>,
    keys: HashSet<String>,
}

impl IgnoreRules {
    /// Rules from a flat list of paths and globs
    pub fn new(fields: &[String]) -> Result<Self, DiffTreeError> {
        Self::from_spec(&IgnoreSpec::from_fields(fields))
    }

    /// Rules from the structured form
    pub fn from_spec(spec: &IgnoreSpec) -> Result<Self, DiffTreeError> {
        let patterns = spec
            .patterns
            .iter()
            .map(|pattern| compile_glob(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            exact: spec.exact.iter().cloned().collect(),
            patterns,
            keys: spec.keys.iter().cloned().collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.patterns.is_empty() && self.keys.is_empty()
    }

    /// Check whether a node path is ignored, reading its key from the path
    pub fn matches(&self, path: &str) -> bool {
        self.matches_node(path, &last_key(path))
    }

    /// Check a node whose key is already known
    ///
    /// Key rules compare against `key` itself, so keys holding dots or
    /// brackets are matched whole.
    pub fn matches_node(&self, path: &str, key: &PathSegment) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.exact.contains(path) {
            return true;
        }
        if self.patterns.iter().any(|re| re.is_match(path)) {
            return true;
        }
        key.as_key().is_some_and(|key| self.keys.contains(key))
    }
}

/// `*` matches any run of characters, everything else is literal
fn compile_glob(pattern: &str) -> Result<Regex, DiffTreeError> {
    let body = regex::escape(pattern).replace(r"\*", ".*");
    Regex::new(&format!("^{}$", body)).map_err(|source| DiffTreeError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// JSON Pointers are converted to dot notation, anything else is kept
fn to_dot_path(entry: &str) -> String {
    if entry.starts_with('/') {
        pointer_to_path(entry)
    } else {
        entry.to_string()
    }
}

/// Extract paths from a JSON object recursively.
/// For each key with a truthy value, adds the path /prefix/key.
/// Only adds leaf paths (doesn't add intermediate parent paths).
fn extract_paths_from_value(value: &Value, prefix: &str, paths: &mut Vec<String>) {
    let Some(obj) = value.as_object() else {
        return;
    };
    for (key, val) in obj {
        let has_entries = val.as_object().is_some_and(|nested| !nested.is_empty());
        let is_truthy = val == &Value::Bool(true) || has_entries || val.is_number();
        if !is_truthy {
            continue;
        }

        let escaped = key.replace('~', "~0").replace('/', "~1");
        let path = format!("{}/{}", prefix, escaped);

        if has_entries {
            extract_paths_from_value(val, &path, paths);
        } else {
            paths.push(path);
        }
    }
}

fn is_structured(obj: &serde_json::Map<String, Value>) -> bool {
    !obj.is_empty()
        && obj
            .iter()
            .all(|(k, v)| matches!(k.as_str(), "exact" | "patterns" | "keys") && v.is_array())
}

/// Turn a parsed ignore document into an [`IgnoreSpec`]
pub fn parse_ignore_value(value: &Value) -> Result<IgnoreSpec, DiffTreeError> {
    match value {
        Value::Array(items) => {
            let mut fields = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some("") => {
                        return Err(DiffTreeError::invalid_args(
                            "Ignore entries must not be empty",
                        ))
                    }
                    Some(entry) => fields.push(to_dot_path(entry)),
                    None => {
                        return Err(DiffTreeError::invalid_args(
                            "All elements in ignoreFields must be strings",
                        ))
                    }
                }
            }
            Ok(IgnoreSpec::from_fields(&fields))
        }
        Value::Object(obj) if is_structured(obj) => {
            let mut spec: IgnoreSpec = serde_json::from_value(value.clone())?;
            spec.exact = spec.exact.iter().map(|e| to_dot_path(e)).collect();
            Ok(spec)
        }
        Value::Object(_) => {
            let mut pointers = Vec::new();
            extract_paths_from_value(value, "", &mut pointers);

            let mut exact: Vec<String> = pointers.iter().map(|p| to_dot_path(p)).collect();
            exact.sort();
            exact.dedup();

            Ok(IgnoreSpec {
                exact,
                ..Default::default()
            })
        }
        _ => Err(DiffTreeError::invalid_args(
            "Ignore file must be either a JSON array of strings or a JSON object",
        )),
    }
}

/// Load ignore rules from a JSON file.
/// The file can contain either:
/// - A JSON array of paths: `["user.id", "/config/password", "items[*].ts"]`
/// - A structured object: `{"exact": [...], "patterns": [...], "keys": [...]}`
/// - A JSON object with truthy values: `{"user": {"id": true}, "tags": true}`
pub fn load_ignore_spec(path: &Path) -> Result<IgnoreSpec, DiffTreeError> {
    if !path.is_file() {
        return Err(DiffTreeError::FileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a file: {}", path.display()),
            ),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| DiffTreeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|source| DiffTreeError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    parse_ignore_value(&value)
}

/// Load and combine ignore rules from multiple JSON files
pub fn load_all_ignore_specs<P: AsRef<Path>>(paths: &[P]) -> Result<IgnoreSpec, DiffTreeError> {
    let mut combined = IgnoreSpec::default();
    for path in paths {
        combined.extend(load_ignore_spec(path.as_ref())?);
    }
    Ok(combined)
}
