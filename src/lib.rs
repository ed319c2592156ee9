//! difftree - structural JSON difference trees
//!
//! Compares two JSON documents and builds a tree mirroring their union, where
//! every node carries a status (`unchanged`, `modified`, `added`, `deleted` or
//! `ignored`), a field type and display values. Results come wrapped in an
//! envelope with statistics, metadata and diagnostics.
//!
//! ```
//! use difftree::{diff, DiffOptions, Status};
//! use serde_json::json;
//!
//! let result = diff(
//!     &json!({"name": "Ann", "age": 30}),
//!     &json!({"name": "Ann", "age": 31}),
//!     &[],
//!     &DiffOptions::default(),
//! )
//! .unwrap();
//!
//! assert!(result.success);
//! assert_eq!(result.node("age").unwrap().status, Status::Modified);
//! ```

pub use api::{diff, generate_diff_tree, parse_options, DiffRequest};
pub use config::{
    merge_config, validate_config, ArrayOptimization, DiffConfig, DiffOptions, StringComparison,
    DEFAULT_MAX_DEPTH, DIFF_TREE_VERSION,
};
pub use diff::{ComparisonContext, DiffEngine};
pub use error::{CompareError, DiffTreeError};
pub use formatter::create_formatter;
pub use ignore::{load_all_ignore_specs, load_ignore_spec, IgnoreRules, IgnoreSpec};
pub use path::{PathSegment, ROOT_PATH};
pub use loader::{load_json_file, load_json_input};
pub use logging::LogFormat;
pub use stats::{DetailedReport, StatisticsCollector, Summary};
pub use types::{
    Diagnostic, Diagnostics, DiffNode, DiffResult, FieldType, Metadata, NodeError, Statistics,
    Status,
};
pub use value::{DiffValue, ValueType};

mod api;
mod config;
pub mod diff;
mod error;
pub mod formatter;
pub mod ignore;
mod loader;
pub mod logging;
pub mod normalize;
pub mod path;
pub mod stats;
pub mod types;
mod value;
