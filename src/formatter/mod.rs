//! Formatter module for outputting diff results
//!
//! This module provides different output formatters for diff results.
//! The default is the "json" format which outputs the full result envelope
//! with the difference tree, statistics, metadata and diagnostics.

mod changes;
mod html;
mod json;

pub use changes::ChangesFormatter;
pub use html::HtmlFormatter;
pub use json::JsonFormatter;

use std::fmt;

use crate::types::{DiffNode, DiffResult, Status};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Full result envelope
    #[default]
    #[value(name = "json")]
    Json,

    /// Flat lists of changed paths: {added, deleted, modified, ignored}
    #[value(name = "changes")]
    Changes,

    /// HTML fragment listing changed fields
    #[value(name = "html")]
    Html,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Changes => write!(f, "changes"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Trait for formatting diff results
pub trait Formatter {
    /// Format the result and return a string representation
    fn format(&self, result: &DiffResult) -> Result<String, Box<dyn std::error::Error>>;
}

/// Factory function to create a formatter based on output format
pub fn create_formatter(format: OutputFormat, pretty: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter::with_pretty(pretty)),
        OutputFormat::Changes => Box::new(ChangesFormatter::with_pretty(pretty)),
        OutputFormat::Html => Box::new(HtmlFormatter::new()),
    }
}

/// Leaf nodes whose status is not unchanged, in tree order
pub(crate) fn changed_leaves(result: &DiffResult) -> impl Iterator<Item = &DiffNode> {
    result
        .tree
        .iter()
        .flat_map(|tree| tree.walk())
        .filter(|node| node.is_leaf() && node.status != Status::Unchanged)
}
