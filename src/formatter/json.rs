use crate::formatter::Formatter;
use crate::types::DiffResult;

/// Formatter for the full result envelope
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new JsonFormatter with pretty printing enabled
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, result: &DiffResult) -> Result<String, Box<dyn std::error::Error>> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(result)?)
        } else {
            Ok(serde_json::to_string(result)?)
        }
    }
}
