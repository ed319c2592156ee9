//! Display-side value handling
//!
//! Comparison works on [`DiffValue`]s; what ends up on a node is a JSON
//! rendering of them. Containers are rendered as length-capped JSON text so a
//! node never embeds a whole subtree twice.

use std::io;

use serde_json::Value;

use crate::types::Status;
use crate::value::DiffValue;

static NULL: DiffValue = DiffValue::Null;

const TRUNCATION_SUFFIX: &str = "...";

/// Collapse runs of whitespace to a single space and trim both ends
pub fn normalize_string(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cap `s` at `max_len` characters, ending in `...` when cut
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(TRUNCATION_SUFFIX.len());
    let mut truncated: String = s.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

/// Sink that stops accepting bytes once it holds enough to fill a capped rendering
struct CappedWriter {
    buf: Vec<u8>,
    limit: usize,
    capped: bool,
}

impl io::Write for CappedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if self.buf.len() >= self.limit {
            self.capped = true;
            return Err(io::Error::new(io::ErrorKind::WriteZero, "capped"));
        }
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Render a value as JSON text capped at `max_len` characters
///
/// Large structures are not serialized past the cap. Falls back to
/// `"[Object]"` if the value cannot be rendered at all.
pub fn format_complex_value(value: &DiffValue, max_len: usize) -> String {
    // A char is at most 4 bytes; one spare char tells us whether to truncate
    let mut writer = CappedWriter {
        buf: Vec::new(),
        limit: (max_len + 1) * 4,
        capped: false,
    };
    if serde_json::to_writer(&mut writer, value).is_err() && !writer.capped {
        return "[Object]".to_string();
    }
    truncate_string(&String::from_utf8_lossy(&writer.buf), max_len)
}

/// Resolve which values a node should show for the given status
///
/// A missing side of an added or deleted node shows as null. A missing side
/// in any other status is left out.
pub fn create_normalized_values<'a>(
    old: &'a DiffValue,
    new: &'a DiffValue,
    status: Status,
) -> (Option<&'a DiffValue>, Option<&'a DiffValue>) {
    let side = |value: &'a DiffValue| -> Option<&'a DiffValue> {
        match value {
            DiffValue::Undefined if matches!(status, Status::Added | Status::Deleted) => {
                Some(&NULL)
            }
            DiffValue::Undefined => None,
            other => Some(other),
        }
    };
    (side(old), side(new))
}

/// JSON shown on a node for one side
pub fn display_value(value: &DiffValue, max_len: usize) -> Value {
    if value.is_complex() {
        Value::String(format_complex_value(value, max_len))
    } else {
        value.to_json()
    }
}
