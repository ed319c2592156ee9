use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::{validate_config, DiffConfig, StringComparison, DIFF_TREE_VERSION};
use crate::error::DiffTreeError;
use crate::ignore::IgnoreRules;
use crate::normalize::normalize_string;
use crate::path::{build_path, child_path, ROOT_PATH};
use crate::stats::StatisticsCollector;
use crate::types::{
    DiffNode, DiffResult, Diagnostic, Diagnostics, FieldType, Metadata, Statistics, Status,
};
use crate::value::DiffValue;

use super::propagate::propagate_status;
use super::router::compare_nodes;
use super::ComparisonContext;

const VALIDATION_WARNING: &str = "VALIDATION_WARNING";
const PROCESSING_ERROR: &str = "PROCESSING_ERROR";

/// Builds difference trees for one configuration and set of ignore rules
///
/// Every call to [`DiffEngine::generate_diff_tree`] starts from fresh
/// statistics and diagnostics; the previous run's remain readable until then.
#[derive(Debug)]
pub struct DiffEngine {
    config: DiffConfig,
    ignore: IgnoreRules,
    stats: StatisticsCollector,
}

impl DiffEngine {
    pub fn new(config: DiffConfig, ignore: IgnoreRules) -> Self {
        Self::with_collector(config, ignore, StatisticsCollector::new())
    }

    pub fn with_collector(
        config: DiffConfig,
        ignore: IgnoreRules,
        stats: StatisticsCollector,
    ) -> Self {
        Self {
            config,
            ignore,
            stats,
        }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare `old` with `new` and package the result envelope
    ///
    /// Never fails: anything that goes wrong outside a single node's
    /// comparison produces an envelope with `success: false`.
    pub fn generate_diff_tree(&mut self, old: &DiffValue, new: &DiffValue) -> DiffResult {
        self.reset();
        self.stats.start_timing();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.build_tree(old, new)));
        self.stats.end_timing();

        match outcome {
            Ok(Ok(tree)) => self.success(tree),
            Ok(Err(err)) => self.failure(err.to_string()),
            Err(payload) => self.failure(panic_message(payload.as_ref())),
        }
    }

    /// Counts from the most recent run
    pub fn statistics(&self) -> Statistics {
        self.stats.required_statistics()
    }

    pub fn collector(&self) -> &StatisticsCollector {
        &self.stats
    }

    pub fn errors(&self) -> &[Diagnostic] {
        self.stats.errors()
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        self.stats.warnings()
    }

    pub fn reset(&mut self) {
        self.stats.reset();
    }

    fn build_tree(&mut self, old: &DiffValue, new: &DiffValue) -> Result<DiffNode, DiffTreeError> {
        validate_config(&self.config)?;

        let mut tree = {
            let mut ctx = ComparisonContext::new(&self.config, &self.ignore, &mut self.stats);
            compare_nodes(old, new, ROOT_PATH, &mut ctx)
        };

        propagate_status(&mut tree);
        post_process(&mut tree, &self.config);

        if self.config.enable_diagnostics {
            for (path, message) in validate_structure(&tree) {
                self.stats.record_warning(VALIDATION_WARNING, message, path);
            }
        }

        self.stats.record_node(&tree, 0);
        Ok(tree)
    }

    fn processing_time(&self) -> u64 {
        if self.config.performance_tracking {
            self.stats.processing_time_ms()
        } else {
            0
        }
    }

    fn metadata(&self) -> Metadata {
        Metadata {
            version: DIFF_TREE_VERSION.to_string(),
            timestamp: Utc::now(),
            processing_time: self.processing_time(),
        }
    }

    fn success(&self, tree: DiffNode) -> DiffResult {
        let statistics = self.stats.required_statistics();
        debug!(
            status = %tree.status,
            total = statistics.total,
            modified = statistics.modified,
            processing_ms = self.processing_time(),
            "diff tree generated"
        );

        DiffResult {
            success: true,
            tree: Some(tree),
            statistics,
            metadata: self.metadata(),
            diagnostics: self.stats.diagnostics(),
        }
    }

    fn failure(&mut self, message: String) -> DiffResult {
        error!(error = %message, "diff tree generation failed");
        self.stats
            .record_error(PROCESSING_ERROR, message, ROOT_PATH);

        DiffResult {
            success: false,
            tree: None,
            statistics: Statistics::default(),
            metadata: self.metadata(),
            diagnostics: Diagnostics::new(
                self.stats.errors().to_vec(),
                self.stats.warnings().to_vec(),
            ),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Unexpected failure while building the diff tree".to_string()
    }
}

/// Apply display rules to every node
fn post_process(node: &mut DiffNode, config: &DiffConfig) {
    if config.string_comparison == StringComparison::Normalized && !node.field_type.is_container() {
        for value in [&mut node.old_value, &mut node.new_value].into_iter().flatten() {
            if let Value::String(s) = value {
                *s = normalize_string(s);
            }
        }
    }

    if !config.include_unchanged && node.status == Status::Unchanged {
        node.old_value = None;
        node.new_value = None;
    }

    if let Some(children) = node.children.as_mut() {
        for child in children {
            post_process(child, config);
        }
    }
}

/// Structural problems as `(path, message)` pairs
///
/// Each child's path must be the one its parent and key produce. The root
/// is left out of the duplicate check: a top-level key named `root` shares
/// its path by construction.
fn validate_structure(tree: &DiffNode) -> Vec<(String, String)> {
    let mut problems = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<(&DiffNode, Option<&str>)> = tree
        .children()
        .iter()
        .rev()
        .map(|child| (child, None))
        .collect();

    check_children_allowed(tree, &mut problems);

    while let Some((node, parent)) = stack.pop() {
        if !seen.insert(node.path.as_str()) {
            problems.push((node.path.clone(), "Duplicate node path".to_string()));
        }
        let expected = match node.field_type {
            FieldType::Ellipsis => build_path(parent, "...", true),
            _ => child_path(parent, &node.key),
        };
        if node.path != expected {
            problems.push((
                node.path.clone(),
                format!("Node key '{}' does not match its path", node.key),
            ));
        } else if node.field_type != FieldType::Ellipsis
            && node.key.as_key().is_some_and(|key| key.contains(['.', '[', ']']))
        {
            problems.push((
                node.path.clone(),
                format!("Key '{}' makes the node path ambiguous", node.key),
            ));
        }
        check_children_allowed(node, &mut problems);
        stack.extend(
            node.children()
                .iter()
                .rev()
                .map(|child| (child, Some(node.path.as_str()))),
        );
    }

    problems
}

fn check_children_allowed(node: &DiffNode, problems: &mut Vec<(String, String)>) {
    if node.children.is_some() && !node.field_type.is_container() {
        problems.push((
            node.path.clone(),
            format!("Node of type {} carries children", node.field_type),
        ));
    }
}
