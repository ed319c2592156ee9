use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for difftree operations
#[derive(Debug, Error)]
pub enum DiffTreeError {
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid arguments: {message}")]
    InvalidArgs { message: String },

    #[error("Invalid configuration: {}", errors.join("; "))]
    InvalidConfig { errors: Vec<String> },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl DiffTreeError {
    pub(crate) fn invalid_args(message: impl Into<String>) -> Self {
        DiffTreeError::InvalidArgs {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for DiffTreeError {
    fn from(error: std::io::Error) -> Self {
        DiffTreeError::FileRead {
            path: PathBuf::new(),
            source: error,
        }
    }
}

impl From<serde_json::Error> for DiffTreeError {
    fn from(error: serde_json::Error) -> Self {
        DiffTreeError::JsonParse {
            path: PathBuf::new(),
            source: error,
        }
    }
}

/// Failure while comparing a single node.
///
/// These never escape the router: the node that failed becomes an error leaf
/// and the rest of the tree is still built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error("Maximum nesting depth of {limit} exceeded")]
    DepthLimitExceeded { limit: usize },
}

impl CompareError {
    /// Short name reported as `error.type` on the failed node
    pub fn kind(&self) -> &'static str {
        match self {
            CompareError::DepthLimitExceeded { .. } => "DepthLimitExceeded",
        }
    }
}
