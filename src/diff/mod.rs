//! Diff module for comparing values
//!
//! This module builds the difference tree. The router ([`compare_nodes`]) is
//! the single recursive entry point: the object and array comparators call
//! back into it for every child, so all ignore checks, fast paths, type
//! checks and error containment live in one place.

mod array;
mod engine;
mod node;
mod object;
mod primitive;
mod propagate;
mod router;

pub use array::compare_arrays;
pub use engine::DiffEngine;
pub use object::compare_objects;
pub use primitive::{compare_primitives, values_equal};
pub use propagate::{combined_status, propagate_status};
pub use router::compare_nodes;

use crate::config::DiffConfig;
use crate::error::CompareError;
use crate::ignore::IgnoreRules;
use crate::path::ROOT_PATH;
use crate::stats::StatisticsCollector;
use crate::types::DiffNode;

/// Per-call state shared by the router and the comparators
pub struct ComparisonContext<'a> {
    pub config: &'a DiffConfig,
    pub ignore: &'a IgnoreRules,
    pub stats: &'a mut StatisticsCollector,
    /// Containers being compared, outermost first; `None` marks the tree root
    trail: Vec<Option<String>>,
}

impl<'a> ComparisonContext<'a> {
    pub fn new(
        config: &'a DiffConfig,
        ignore: &'a IgnoreRules,
        stats: &'a mut StatisticsCollector,
    ) -> Self {
        Self {
            config,
            ignore,
            stats,
            trail: Vec::new(),
        }
    }

    /// Current container nesting depth
    pub fn depth(&self) -> usize {
        self.trail.len()
    }

    /// Parent path for children of the innermost open container
    ///
    /// `None` inside the tree root, and outside any container.
    pub fn parent_path(&self) -> Option<&str> {
        self.trail.last().and_then(|path| path.as_deref())
    }

    /// Open containers innermost first, one `at <path>` line each
    pub(crate) fn trace(&self, path: &str) -> String {
        let mut lines = vec![format!("at {}", path)];
        lines.extend(
            self.trail
                .iter()
                .rev()
                .map(|open| format!("at {}", open.as_deref().unwrap_or(ROOT_PATH))),
        );
        lines.join("\n")
    }

    /// Run `compare` one container level deeper, refusing past `max_depth`
    ///
    /// `path` is `None` when the container is the tree root.
    fn nested<F>(&mut self, path: Option<&str>, compare: F) -> Result<DiffNode, CompareError>
    where
        F: FnOnce(&mut Self) -> DiffNode,
    {
        if self.depth() >= self.config.max_depth {
            return Err(CompareError::DepthLimitExceeded {
                limit: self.config.max_depth,
            });
        }
        self.trail.push(path.map(str::to_string));
        let node = compare(self);
        self.trail.pop();
        Ok(node)
    }
}
