//! Statistics collection for a diff run
//!
//! The collector counts nodes of the finished tree by status, type and depth,
//! counts comparisons as the router performs them, holds the run's errors and
//! warnings, and times the run. [`StatisticsCollector::required_statistics`]
//! feeds the result envelope; [`StatisticsCollector::detailed_report`] is the
//! richer view used for diagnostics.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};

use crate::types::{DiffNode, Diagnostic, Diagnostics, Statistics, Status};

/// Processing time above which a performance recommendation is made
const SLOW_PROCESSING_MS: u64 = 5000;
/// Tree depth above which a structure recommendation is made
const DEEP_NESTING: usize = 10;
/// Share of changed nodes above which an analysis recommendation is made
const HIGH_CHANGE_PERCENTAGE: f64 = 80.0;

#[derive(Debug, Default)]
pub struct StatisticsCollector {
    counts: Statistics,
    comparisons: usize,
    type_counts: BTreeMap<&'static str, usize>,
    max_depth: usize,
    depth_distribution: BTreeMap<usize, usize>,
    errors: Vec<Diagnostic>,
    warnings: Vec<Diagnostic>,
    started: Option<Instant>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    processing_time: Duration,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `node` and every descendant, `depth` being the depth of `node`
    pub fn record_node(&mut self, node: &DiffNode, depth: usize) {
        let mut stack = vec![(node, depth)];
        while let Some((node, depth)) = stack.pop() {
            self.counts.total += 1;
            match node.status {
                Status::Unchanged => self.counts.unchanged += 1,
                Status::Modified => self.counts.modified += 1,
                Status::Added => self.counts.added += 1,
                Status::Deleted => self.counts.deleted += 1,
                Status::Ignored => self.counts.ignored += 1,
            }
            *self.type_counts.entry(node.field_type.as_str()).or_default() += 1;
            self.max_depth = self.max_depth.max(depth);
            *self.depth_distribution.entry(depth).or_default() += 1;

            stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
        }
    }

    pub fn record_comparison(&mut self) {
        self.comparisons += 1;
    }

    pub fn record_error(
        &mut self,
        kind: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) {
        self.errors.push(Diagnostic::new(kind, message, path));
    }

    pub fn record_warning(
        &mut self,
        kind: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) {
        self.warnings.push(Diagnostic::new(kind, message, path));
    }

    pub fn start_timing(&mut self) {
        self.started = Some(Instant::now());
        self.start_time = Some(Utc::now());
    }

    pub fn end_timing(&mut self) {
        self.end_time = Some(Utc::now());
        if let Some(started) = self.started {
            self.processing_time = started.elapsed();
        }
    }

    /// Milliseconds between `start_timing` and `end_timing`
    pub fn processing_time_ms(&self) -> u64 {
        u64::try_from(self.processing_time.as_millis()).unwrap_or(u64::MAX)
    }

    pub fn comparisons(&self) -> usize {
        self.comparisons
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::new(self.errors.clone(), self.warnings.clone())
    }

    /// Counts consumed by the result envelope
    pub fn required_statistics(&self) -> Statistics {
        self.counts
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn average_depth(&self) -> f64 {
        if self.counts.total == 0 {
            return 0.0;
        }
        let sum: usize = self
            .depth_distribution
            .iter()
            .map(|(depth, count)| depth * count)
            .sum();
        sum as f64 / self.counts.total as f64
    }

    fn total_changes(&self) -> usize {
        self.counts.modified + self.counts.added + self.counts.deleted
    }

    fn change_percentage(&self) -> f64 {
        if self.counts.total == 0 {
            return 0.0;
        }
        self.total_changes() as f64 / self.counts.total as f64 * 100.0
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_nodes: self.counts.total,
            total_comparisons: self.comparisons,
            total_changes: self.total_changes(),
            change_percentage: round2(self.change_percentage()),
            processing_time: self.processing_time_ms(),
            max_depth: self.max_depth,
            average_depth: round2(self.average_depth()),
            has_errors: !self.errors.is_empty(),
            has_warnings: !self.warnings.is_empty(),
            error_count: self.errors.len(),
            warning_count: self.warnings.len(),
        }
    }

    pub fn detailed_report(&self) -> DetailedReport {
        let processing_ms = self.processing_time_ms();
        let per_second = |count: usize| -> u64 {
            if processing_ms == 0 {
                0
            } else {
                (count as f64 / processing_ms as f64 * 1000.0).round() as u64
            }
        };

        DetailedReport {
            summary: self.summary(),
            details: ReportDetails {
                status_breakdown: StatusBreakdown {
                    unchanged: self.counts.unchanged,
                    modified: self.counts.modified,
                    added: self.counts.added,
                    deleted: self.counts.deleted,
                    ignored: self.counts.ignored,
                },
                type_breakdown: self.type_counts.clone(),
                depth_analysis: DepthAnalysis {
                    max_depth: self.max_depth,
                    average_depth: self.average_depth(),
                    distribution: self.depth_distribution.clone(),
                },
                performance: PerformanceReport {
                    processing_time: processing_ms,
                    start_time: self.start_time,
                    end_time: self.end_time,
                    throughput: Throughput {
                        nodes_per_second: per_second(self.counts.total),
                        comparisons_per_second: per_second(self.comparisons),
                    },
                },
                diagnostics: self.diagnostics(),
            },
            recommendations: self.recommendations(),
        }
    }

    fn recommendations(&self) -> Vec<Recommendation> {
        let mut recommendations = Vec::new();

        if self.processing_time_ms() > SLOW_PROCESSING_MS {
            recommendations.push(Recommendation {
                kind: "performance",
                message: "Processing time is high. Consider using array optimization or reducing data size.",
                severity: Severity::Warning,
            });
        }
        if self.max_depth > DEEP_NESTING {
            recommendations.push(Recommendation {
                kind: "structure",
                message: "Data structure is deeply nested. This may impact performance.",
                severity: Severity::Info,
            });
        }
        if !self.errors.is_empty() {
            recommendations.push(Recommendation {
                kind: "reliability",
                message: "Errors were encountered during processing. Check diagnostics for details.",
                severity: Severity::Error,
            });
        }
        if self.change_percentage() > HIGH_CHANGE_PERCENTAGE {
            recommendations.push(Recommendation {
                kind: "analysis",
                message: "High percentage of changes detected. Consider if this is expected.",
                severity: Severity::Info,
            });
        }

        recommendations
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn serialize_optional_timestamp<S>(
    timestamp: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match timestamp {
        Some(ts) => serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        None => serializer.serialize_none(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_nodes: usize,
    pub total_comparisons: usize,
    pub total_changes: usize,
    pub change_percentage: f64,
    pub processing_time: u64,
    pub max_depth: usize,
    pub average_depth: f64,
    pub has_errors: bool,
    pub has_warnings: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedReport {
    pub summary: Summary,
    pub details: ReportDetails,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetails {
    pub status_breakdown: StatusBreakdown,
    pub type_breakdown: BTreeMap<&'static str, usize>,
    pub depth_analysis: DepthAnalysis,
    pub performance: PerformanceReport,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub unchanged: usize,
    pub modified: usize,
    pub added: usize,
    pub deleted: usize,
    pub ignored: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthAnalysis {
    pub max_depth: usize,
    pub average_depth: f64,
    pub distribution: BTreeMap<usize, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub processing_time: u64,
    #[serde(serialize_with = "serialize_optional_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_optional_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    pub throughput: Throughput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Throughput {
    pub nodes_per_second: u64,
    pub comparisons_per_second: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: &'static str,
    pub severity: Severity,
}
