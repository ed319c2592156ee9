//! Entry point for callers holding plain JSON
//!
//! [`DiffRequest::from_json`] validates an invocation object of the form
//! `{"oldData": ..., "newData": ..., "ignoreFields": [...], "options": {...}}`
//! and [`generate_diff_tree`] runs it. Input validation is the only failure
//! surfaced as an `Err`; everything else ends up in the result envelope.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::config::{
    merge_config, validate_config, DiffConfig, DiffOptions, DIFF_TREE_VERSION,
    MAX_NUMBER_PRECISION,
};
use crate::diff::DiffEngine;
use crate::error::DiffTreeError;
use crate::ignore::{IgnoreRules, IgnoreSpec};
use crate::path::ROOT_PATH;
use crate::types::{Diagnostic, DiffResult, Diagnostics, Metadata, Statistics};
use crate::value::DiffValue;

/// One diff invocation
#[derive(Debug, Clone, PartialEq)]
pub struct DiffRequest {
    pub old_data: DiffValue,
    pub new_data: DiffValue,
    pub ignore: IgnoreSpec,
    pub options: DiffOptions,
}

impl DiffRequest {
    pub fn new(old_data: impl Into<DiffValue>, new_data: impl Into<DiffValue>) -> Self {
        Self {
            old_data: old_data.into(),
            new_data: new_data.into(),
            ignore: IgnoreSpec::default(),
            options: DiffOptions::default(),
        }
    }

    /// Add exact paths and globs to ignore
    pub fn with_ignore_fields(mut self, fields: &[String]) -> Self {
        self.ignore.extend(IgnoreSpec::from_fields(fields));
        self
    }

    pub fn with_ignore_spec(mut self, spec: IgnoreSpec) -> Self {
        self.ignore.extend(spec);
        self
    }

    pub fn with_options(mut self, options: DiffOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the merged options and compile the ignore patterns
    pub fn validate(&self) -> Result<(), DiffTreeError> {
        validate_config(&merge_config(&DiffConfig::default(), &self.options))?;
        IgnoreRules::from_spec(&self.ignore)?;
        Ok(())
    }

    /// Engine configured with this request's options and ignore rules
    ///
    /// Fails only when an ignore pattern does not compile. Invalid option
    /// values are reported by the engine itself.
    pub fn engine(&self) -> Result<DiffEngine, DiffTreeError> {
        let config = merge_config(&DiffConfig::default(), &self.options);
        debug!(?config, "using configuration");
        Ok(DiffEngine::new(config, IgnoreRules::from_spec(&self.ignore)?))
    }

    /// Validate and convert an invocation object
    pub fn from_json(params: &Value) -> Result<Self, DiffTreeError> {
        let params = params
            .as_object()
            .ok_or_else(|| DiffTreeError::invalid_args("params must be an object"))?;

        let old_data = params
            .get("oldData")
            .ok_or_else(|| DiffTreeError::invalid_args("oldData parameter is required"))?;
        let new_data = params
            .get("newData")
            .ok_or_else(|| DiffTreeError::invalid_args("newData parameter is required"))?;

        let fields = match params.get("ignoreFields") {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        DiffTreeError::invalid_args("All elements in ignoreFields must be strings")
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(_) => return Err(DiffTreeError::invalid_args("ignoreFields must be an array")),
        };

        let options = match params.get("options") {
            None => DiffOptions::default(),
            Some(Value::Object(options)) => parse_options(options)?,
            Some(_) => return Err(DiffTreeError::invalid_args("options must be an object")),
        };

        let request = Self::new(old_data, new_data)
            .with_ignore_fields(&fields)
            .with_options(options);
        request.validate()?;
        Ok(request)
    }
}

/// Integers, including integral floats such as `100.0` or `1e3`
fn whole_number(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= u64::MAX as f64)
            .map(|n| n as u64)
    })
}

const INTEGER_OPTIONS: [&str; 4] = ["maxStringLength", "maxArraySize", "arraySampleSize", "maxDepth"];

/// Type-check the recognised option fields, then deserialize them
pub fn parse_options(options: &Map<String, Value>) -> Result<DiffOptions, DiffTreeError> {
    for name in INTEGER_OPTIONS {
        if let Some(value) = options.get(name) {
            if !whole_number(value).is_some_and(|n| n >= 1) {
                return Err(DiffTreeError::invalid_args(format!(
                    "{} must be a positive integer",
                    name
                )));
            }
        }
    }

    if let Some(value) = options.get("arrayOptimization") {
        if !matches!(value.as_str(), Some("shallow" | "deep")) {
            return Err(DiffTreeError::invalid_args(
                r#"arrayOptimization must be "shallow" or "deep""#,
            ));
        }
    }

    if let Some(value) = options.get("stringComparison") {
        if !matches!(
            value.as_str(),
            Some("normalized" | "strict" | "case-insensitive")
        ) {
            return Err(DiffTreeError::invalid_args(
                r#"stringComparison must be "normalized", "strict" or "case-insensitive""#,
            ));
        }
    }

    for name in ["includeUnchanged", "enableDiagnostics", "performanceTracking"] {
        if let Some(value) = options.get(name) {
            if !value.is_boolean() {
                return Err(DiffTreeError::invalid_args(format!(
                    "{} must be a boolean",
                    name
                )));
            }
        }
    }

    if let Some(value) = options.get("numberPrecision") {
        let in_range = whole_number(value).is_some_and(|p| p <= u64::from(MAX_NUMBER_PRECISION));
        if !in_range {
            return Err(DiffTreeError::invalid_args(format!(
                "numberPrecision must be an integer between 0 and {}",
                MAX_NUMBER_PRECISION
            )));
        }
    }

    let mut options = options.clone();
    for name in INTEGER_OPTIONS.iter().chain(["numberPrecision"].iter()) {
        if let Some(n) = options.get(*name).and_then(whole_number) {
            options.insert(name.to_string(), Value::from(n));
        }
    }
    Ok(serde_json::from_value(Value::Object(options))?)
}

/// Run a request and return its envelope
pub fn generate_diff_tree(request: &DiffRequest) -> DiffResult {
    match request.engine() {
        Ok(mut engine) => {
            let result = engine.generate_diff_tree(&request.old_data, &request.new_data);
            info!(
                success = result.success,
                total = result.statistics.total,
                modified = result.statistics.modified,
                added = result.statistics.added,
                deleted = result.statistics.deleted,
                "diff tree generation finished"
            );
            result
        }
        Err(err) => rejected(err.to_string()),
    }
}

/// Failure envelope for a request that never reached the engine
fn rejected(message: String) -> DiffResult {
    DiffResult {
        success: false,
        tree: None,
        statistics: Statistics::default(),
        metadata: Metadata {
            version: DIFF_TREE_VERSION.to_string(),
            timestamp: chrono::Utc::now(),
            processing_time: 0,
        },
        diagnostics: Diagnostics::new(
            vec![Diagnostic::new("PROCESSING_ERROR", message, ROOT_PATH)],
            Vec::new(),
        ),
    }
}

/// Compare two JSON values
///
/// Options and ignore rules are validated up front, the same way
/// [`DiffRequest::from_json`] validates them; an invalid setting is
/// returned as an error before any comparison starts.
pub fn diff(
    old: &Value,
    new: &Value,
    ignore_fields: &[String],
    options: &DiffOptions,
) -> Result<DiffResult, DiffTreeError> {
    let request = DiffRequest::new(old, new)
        .with_ignore_fields(ignore_fields)
        .with_options(options.clone());
    request.validate()?;

    let mut engine = request.engine()?;
    Ok(engine.generate_diff_tree(&request.old_data, &request.new_data))
}
