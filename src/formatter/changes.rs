use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::formatter::{changed_leaves, Formatter};
use crate::types::{DiffNode, DiffResult, Status};

/// Formatter for the "changes" output format
///
/// This formatter outputs a JSON object with four arrays of leaf changes:
/// - added: values present only in the new data
/// - deleted: values present only in the old data
/// - modified: values that changed, including type changes and failed nodes
/// - ignored: paths matched by an ignore rule
pub struct ChangesFormatter {
    pretty: bool,
}

impl ChangesFormatter {
    /// Create a new ChangesFormatter with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for ChangesFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of a change list
struct Entry<'a>(&'a DiffNode);

impl Serialize for Entry<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let node = self.0;
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("path", &node.path)?;
        match node.status {
            Status::Added => map.serialize_entry("value", &node.new_value)?,
            Status::Deleted => map.serialize_entry("value", &node.old_value)?,
            Status::Modified => {
                map.serialize_entry("fieldType", &node.field_type)?;
                if let Some(error) = &node.error {
                    map.serialize_entry("error", &error.message)?;
                } else {
                    map.serialize_entry("oldValue", &node.old_value)?;
                    map.serialize_entry("newValue", &node.new_value)?;
                }
            }
            Status::Ignored | Status::Unchanged => {}
        }
        map.end()
    }
}

#[derive(Serialize)]
struct ChangeLists<'a> {
    added: Vec<Entry<'a>>,
    deleted: Vec<Entry<'a>>,
    modified: Vec<Entry<'a>>,
    ignored: Vec<Entry<'a>>,
}

impl Formatter for ChangesFormatter {
    fn format(&self, result: &DiffResult) -> Result<String, Box<dyn std::error::Error>> {
        let mut lists = ChangeLists {
            added: Vec::new(),
            deleted: Vec::new(),
            modified: Vec::new(),
            ignored: Vec::new(),
        };

        for node in changed_leaves(result) {
            let list = match node.status {
                Status::Added => &mut lists.added,
                Status::Deleted => &mut lists.deleted,
                Status::Modified => &mut lists.modified,
                Status::Ignored => &mut lists.ignored,
                Status::Unchanged => continue,
            };
            list.push(Entry(node));
        }

        if self.pretty {
            Ok(serde_json::to_string_pretty(&lists)?)
        } else {
            Ok(serde_json::to_string(&lists)?)
        }
    }
}
