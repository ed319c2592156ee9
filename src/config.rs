//! Comparison settings
//!
//! [`DiffOptions`] is what callers hand in: every field optional, unknown keys
//! dropped. [`merge_config`] overlays it onto [`DiffConfig::default`] and
//! [`validate_config`] checks the result before any comparison starts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DiffTreeError;

/// Reported as `metadata.version`
pub const DIFF_TREE_VERSION: &str = "1.0.0";

/// Largest meaningful decimal precision for an f64 comparison
pub const MAX_NUMBER_PRECISION: u32 = 15;

/// Default container nesting limit
///
/// Matches the nesting `serde_json` accepts when parsing, and keeps the
/// comparison well inside a 2 MiB thread stack. Larger limits need a
/// correspondingly larger stack.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How arrays are walked
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ArrayOptimization {
    /// Sample large arrays instead of comparing every element
    #[default]
    Shallow,
    /// Always compare every element
    Deep,
}

impl ArrayOptimization {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrayOptimization::Shallow => "shallow",
            ArrayOptimization::Deep => "deep",
        }
    }
}

impl fmt::Display for ArrayOptimization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality rule for strings
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum StringComparison {
    /// Equal after collapsing whitespace
    #[default]
    Normalized,
    /// Byte-for-byte equal
    Strict,
    /// Equal after lowercasing
    CaseInsensitive,
}

impl StringComparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            StringComparison::Normalized => "normalized",
            StringComparison::Strict => "strict",
            StringComparison::CaseInsensitive => "case-insensitive",
        }
    }
}

impl fmt::Display for StringComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merged and validated settings for one diff call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffConfig {
    /// Cap for the rendered text of object and array values
    pub max_string_length: usize,
    pub array_optimization: ArrayOptimization,
    pub string_comparison: StringComparison,
    /// Keep old/new values on unchanged nodes
    pub include_unchanged: bool,
    /// Run structural validation and record warnings
    pub enable_diagnostics: bool,
    /// Report real processing time
    pub performance_tracking: bool,
    /// Numbers are equal when they differ by less than `10^-precision`
    pub number_precision: Option<u32>,
    /// Arrays longer than this are sampled in shallow mode
    pub max_array_size: usize,
    /// Leading elements compared when sampling
    pub array_sample_size: usize,
    /// Container nesting limit
    pub max_depth: usize,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_string_length: 100,
            array_optimization: ArrayOptimization::Shallow,
            string_comparison: StringComparison::Normalized,
            include_unchanged: true,
            enable_diagnostics: true,
            performance_tracking: true,
            number_precision: None,
            max_array_size: 1000,
            array_sample_size: 10,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Caller overrides; `None` keeps the default
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiffOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_string_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_optimization: Option<ArrayOptimization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string_comparison: Option<StringComparison>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_unchanged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_diagnostics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_array_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub array_sample_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

impl DiffOptions {
    /// Fill fields unset here from `other`
    pub fn or(self, other: DiffOptions) -> DiffOptions {
        DiffOptions {
            max_string_length: self.max_string_length.or(other.max_string_length),
            array_optimization: self.array_optimization.or(other.array_optimization),
            string_comparison: self.string_comparison.or(other.string_comparison),
            include_unchanged: self.include_unchanged.or(other.include_unchanged),
            enable_diagnostics: self.enable_diagnostics.or(other.enable_diagnostics),
            performance_tracking: self.performance_tracking.or(other.performance_tracking),
            number_precision: self.number_precision.or(other.number_precision),
            max_array_size: self.max_array_size.or(other.max_array_size),
            array_sample_size: self.array_sample_size.or(other.array_sample_size),
            max_depth: self.max_depth.or(other.max_depth),
        }
    }
}

/// Overlay the options that are set onto `defaults`
pub fn merge_config(defaults: &DiffConfig, options: &DiffOptions) -> DiffConfig {
    DiffConfig {
        max_string_length: options
            .max_string_length
            .unwrap_or(defaults.max_string_length),
        array_optimization: options
            .array_optimization
            .unwrap_or(defaults.array_optimization),
        string_comparison: options
            .string_comparison
            .unwrap_or(defaults.string_comparison),
        include_unchanged: options
            .include_unchanged
            .unwrap_or(defaults.include_unchanged),
        enable_diagnostics: options
            .enable_diagnostics
            .unwrap_or(defaults.enable_diagnostics),
        performance_tracking: options
            .performance_tracking
            .unwrap_or(defaults.performance_tracking),
        number_precision: options.number_precision.or(defaults.number_precision),
        max_array_size: options.max_array_size.unwrap_or(defaults.max_array_size),
        array_sample_size: options
            .array_sample_size
            .unwrap_or(defaults.array_sample_size),
        max_depth: options.max_depth.unwrap_or(defaults.max_depth),
    }
}

/// Check a merged config, collecting every problem
pub fn validate_config(config: &DiffConfig) -> Result<(), DiffTreeError> {
    let mut errors = Vec::new();

    let positive = [
        ("maxStringLength", config.max_string_length),
        ("maxArraySize", config.max_array_size),
        ("arraySampleSize", config.array_sample_size),
        ("maxDepth", config.max_depth),
    ];
    for (name, value) in positive {
        if value < 1 {
            errors.push(format!("{} must be a positive integer", name));
        }
    }

    if let Some(precision) = config.number_precision {
        if precision > MAX_NUMBER_PRECISION {
            errors.push(format!(
                "numberPrecision must be an integer between 0 and {}",
                MAX_NUMBER_PRECISION
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DiffTreeError::InvalidConfig { errors })
    }
}
