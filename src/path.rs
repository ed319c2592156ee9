/// Utilities for building and reading node paths
///
/// Format: `users[0].name` for nested structures
/// - Root path: `"root"`
/// - Object access: `.key` or `key` (when the parent is the root)
/// - Array access: `[0]` (index in brackets)
///
/// Whether a parent is the root is passed explicitly as `None`, so a field
/// that happens to be called `root` nests like any other.
use serde::{Serialize, Serializer};
use std::fmt;

/// Path of the top-level node
pub const ROOT_PATH: &str = "root";

/// One step of a path: an object key or an array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

/// Keys print bare, indices as `[i]`; this is the form used for child keys
impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// A string for keys, a number for indices
impl Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            PathSegment::Key(key) => serializer.serialize_str(key),
            PathSegment::Index(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

/// Build a path string from a parent path and a key or bracketed index
///
/// `parent` is `None` for children of the root.
pub fn build_path(parent: Option<&str>, key: &str, is_array_index: bool) -> String {
    match (parent, is_array_index) {
        (None, false) => key.to_string(),
        (None, true) => format!("[{}]", key),
        (Some(parent), false) => format!("{}.{}", parent, key),
        (Some(parent), true) => format!("{}[{}]", parent, key),
    }
}

/// Build a path string from a parent path and an array index
pub fn build_index_path(parent: Option<&str>, index: usize) -> String {
    build_path(parent, &index.to_string(), true)
}

/// Path of the child of `parent` addressed by `segment`
pub fn child_path(parent: Option<&str>, segment: &PathSegment) -> String {
    match segment {
        PathSegment::Key(key) => build_path(parent, key, false),
        PathSegment::Index(index) => build_index_path(parent, *index),
    }
}

/// Convert a JSON Pointer (RFC 6901) to a node path
///
/// All-digit tokens are read as array indices.
pub fn pointer_to_path(pointer: &str) -> String {
    let mut path: Option<String> = None;
    for token in pointer.split('/').filter(|token| !token.is_empty()) {
        let segment = match token.parse::<usize>() {
            Ok(index) if token.bytes().all(|b| b.is_ascii_digit()) => PathSegment::Index(index),
            _ => PathSegment::Key(token.replace("~1", "/").replace("~0", "~")),
        };
        path = Some(child_path(path.as_deref(), &segment));
    }
    path.unwrap_or_else(|| ROOT_PATH.to_string())
}

/// Split a path into its segments
///
/// Brackets delimit an index; a dot separates keys only outside brackets.
/// Bracket content that is not a number (such as `[...]`) is kept as a key.
/// Never fails: malformed input yields whatever segments could be read.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    if path.is_empty() || path == ROOT_PATH {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;

    for ch in path.chars() {
        match ch {
            '[' if !in_brackets => {
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
                in_brackets = true;
            }
            ']' if in_brackets => {
                if !current.is_empty() {
                    let content = std::mem::take(&mut current);
                    segments.push(match content.parse::<usize>() {
                        Ok(index) => PathSegment::Index(index),
                        Err(_) => PathSegment::Key(format!("[{}]", content)),
                    });
                }
                in_brackets = false;
            }
            '.' if !in_brackets => {
                if !current.is_empty() {
                    segments.push(PathSegment::Key(std::mem::take(&mut current)));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(PathSegment::Key(current));
    }

    segments
}

/// The trailing segment of a path, `root` for the root itself
pub fn last_key(path: &str) -> PathSegment {
    parse_path(path)
        .pop()
        .unwrap_or_else(|| PathSegment::Key(ROOT_PATH.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> PathSegment {
        PathSegment::Key(k.to_string())
    }

    #[test]
    fn test_build_path_root() {
        assert_eq!(build_path(None, "name", false), "name");
        assert_eq!(build_index_path(None, 0), "[0]");
    }

    #[test]
    fn test_build_path_nested() {
        assert_eq!(build_path(Some("user"), "name", false), "user.name");
        assert_eq!(build_path(Some("user.address"), "city", false), "user.address.city");
    }

    #[test]
    fn test_field_named_root_nests() {
        assert_eq!(build_path(Some("root"), "a", false), "root.a");
        assert_eq!(build_path(Some(""), "a", false), ".a");
        assert_eq!(build_index_path(Some("root"), 1), "root[1]");
    }

    #[test]
    fn test_build_index_path() {
        assert_eq!(build_index_path(Some("users"), 0), "users[0]");
        assert_eq!(build_index_path(Some("users[0].friends"), 1), "users[0].friends[1]");
        assert_eq!(build_path(Some("items"), "...", true), "items[...]");
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path(None, &PathSegment::Index(2)), "[2]");
        assert_eq!(child_path(Some("a"), &key("b")), "a.b");
    }

    #[test]
    fn test_pointer_to_path() {
        assert_eq!(pointer_to_path("/user/tags/0/a~1b"), "user.tags[0].a/b");
        assert_eq!(pointer_to_path("/x~0y"), "x~y");
        assert_eq!(pointer_to_path("/0/id"), "[0].id");
        assert_eq!(pointer_to_path("/items/01x"), "items.01x");
        assert_eq!(pointer_to_path(""), "root");
    }

    #[test]
    fn test_parse_path() {
        assert!(parse_path(ROOT_PATH).is_empty());
        assert_eq!(
            parse_path("a[0].c"),
            vec![key("a"), PathSegment::Index(0), key("c")]
        );
        assert_eq!(
            parse_path("[2][3]"),
            vec![PathSegment::Index(2), PathSegment::Index(3)]
        );
    }

    #[test]
    fn test_parse_path_keeps_dots_inside_brackets() {
        assert_eq!(parse_path("items[...]"), vec![key("items"), key("[...]")]);
    }

    #[test]
    fn test_last_key() {
        assert_eq!(last_key(ROOT_PATH), key("root"));
        assert_eq!(last_key("a.b"), key("b"));
        assert_eq!(last_key("a[2]"), PathSegment::Index(2));
        assert_eq!(last_key("a[2].c[10]"), PathSegment::Index(10));
    }

    #[test]
    fn test_segment_display_and_serialization() {
        assert_eq!(PathSegment::Index(3).to_string(), "[3]");
        assert_eq!(serde_json::to_string(&PathSegment::Index(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&key("a")).unwrap(), "\"a\"");
    }
}
