use std::collections::HashMap;
use std::fmt::Write;

use serde_json::Value;

use crate::formatter::{changed_leaves, Formatter};
use crate::types::{DiffNode, DiffResult, Status};

const STYLE: &str = r#"<style>
    .diff-container { font-family: Arial, sans-serif; padding: 15px; border: 1px solid #ddd; border-radius: 5px; }
    .diff-item { margin-bottom: 10px; padding: 8px; border-radius: 4px; }
    .diff-item.added { background-color: #e6ffed; border-left: 4px solid #28a745; }
    .diff-item.removed { background-color: #ffeef0; border-left: 4px solid #cb2431; }
    .diff-item.changed { background-color: #fff8e6; border-left: 4px solid #ffd33d; }
    .field-name { font-weight: bold; display: block; margin-bottom: 5px; }
    .change-container { display: flex; align-items: center; gap: 10px; margin-top: 5px; }
    .old-value { color: #cb2431; background-color: #ffeef0; padding: 2px 6px; border-radius: 3px; }
    .arrow { color: #666; font-weight: bold; }
    .new-value { color: #28a745; background-color: #e6ffed; padding: 2px 6px; border-radius: 3px; }
    .value { display: block; margin-bottom: 5px; }
    .value-label { font-weight: bold; margin-right: 5px; }
</style>
"#;

/// Formatter rendering changed fields as a self-contained HTML fragment
///
/// Ignored fields are left out. Field names can be replaced with display
/// labels keyed by the last path segment.
#[derive(Default)]
pub struct HtmlFormatter {
    labels: HashMap<String, String>,
}

impl HtmlFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }

    /// Path with its last segment swapped for a label, if one is known
    fn field_name(&self, node: &DiffNode) -> String {
        let key = node.key.to_string();
        match self.labels.get(&key) {
            Some(label) => match node.path.strip_suffix(key.as_str()) {
                Some(prefix) => format!("{}{}", prefix, label),
                None => label.clone(),
            },
            None => node.path.clone(),
        }
    }
}

/// Escape text for use in element content
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn display(value: &Option<Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => escape_html(s),
        Some(other) => escape_html(&other.to_string()),
    }
}

impl Formatter for HtmlFormatter {
    fn format(&self, result: &DiffResult) -> Result<String, Box<dyn std::error::Error>> {
        let mut html = String::from(STYLE);
        html.push_str("<div class=\"diff-container\">\n");

        for node in changed_leaves(result) {
            let field = escape_html(&self.field_name(node));
            match node.status {
                Status::Added => write!(
                    html,
                    "  <div class=\"diff-item added\">\n    <span class=\"field-name\">{}</span>\n    <span class=\"value\"><span class=\"value-label\">Added:</span> {}</span>\n  </div>\n",
                    field,
                    display(&node.new_value)
                )?,
                Status::Deleted => write!(
                    html,
                    "  <div class=\"diff-item removed\">\n    <span class=\"field-name\">{}</span>\n    <span class=\"value\"><span class=\"value-label\">Removed:</span> {}</span>\n  </div>\n",
                    field,
                    display(&node.old_value)
                )?,
                Status::Modified => {
                    let (old, new) = match &node.error {
                        Some(error) => (escape_html(&error.message), String::new()),
                        None => (display(&node.old_value), display(&node.new_value)),
                    };
                    write!(
                        html,
                        "  <div class=\"diff-item changed\">\n    <span class=\"field-name\">{}</span>\n    <div class=\"change-container\">\n      <span class=\"old-value\">{}</span>\n      <span class=\"arrow\">\u{2192}</span>\n      <span class=\"new-value\">{}</span>\n    </div>\n  </div>\n",
                        field, old, new
                    )?
                }
                Status::Ignored | Status::Unchanged => {}
            }
        }

        html.push_str("</div>\n");
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::diff;
    use crate::config::DiffOptions;
    use serde_json::json;

    fn render(formatter: &HtmlFormatter, old: Value, new: Value) -> String {
        let result = diff(&old, &new, &[], &DiffOptions::default()).unwrap();
        formatter.format(&result).unwrap()
    }

    #[test]
    fn test_render_change_kinds() {
        let html = render(
            &HtmlFormatter::new(),
            json!({"age": 30, "phone": "555"}),
            json!({"age": 31, "email": "j@x.com"}),
        );

        assert!(html.contains("diff-item changed"));
        assert!(html.contains("<span class=\"old-value\">30</span>"));
        assert!(html.contains("<span class=\"new-value\">31</span>"));
        assert!(html.contains("diff-item added"));
        assert!(html.contains("j@x.com"));
        assert!(html.contains("diff-item removed"));
        assert!(html.contains(">phone<"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render(&HtmlFormatter::new(), json!({"a": "<b>"}), json!({"a": "x & y"}));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("x &amp; y"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_labels_replace_last_segment() {
        let mut labels = HashMap::new();
        labels.insert("city".to_string(), "City name".to_string());
        let formatter = HtmlFormatter::with_labels(labels);

        let html = render(
            &formatter,
            json!({"address": {"city": "A"}}),
            json!({"address": {"city": "B"}}),
        );
        assert!(html.contains(">address.City name<"));
    }

    #[test]
    fn test_no_changes_renders_empty_container() {
        let html = render(&HtmlFormatter::new(), json!({"a": 1}), json!({"a": 1}));
        assert!(html.contains("<div class=\"diff-container\">"));
        assert!(!html.contains("class=\"diff-item"));
    }
}
