//! Markdown report generation for engine traces.
//!
//! This module provides the [`MarkdownGenerator`] struct for converting a
//! [`TraceReport`] into a human-readable Markdown document. The generated
//! report includes:
//!
//! - A summary table with input, output and counters
//! - The algorithm's complexity
//! - A per-state step histogram
//! - Optionally, every step as a table row
//!
//! # Example
//!
//! ```rust
//! use sortviz_engine::Algorithm;
//! use sortviz_report::{MarkdownGenerator, TraceReport};
//!
//! let report = TraceReport::build(Algorithm::BubbleSort, &[2.0, 1.0], false).unwrap();
//! let markdown = MarkdownGenerator::new(&report).generate();
//! assert!(markdown.contains("# Sorting Trace: Bubble Sort"));
//! ```

use std::fmt::Write;

use chrono::{DateTime, Utc};
use sortviz_engine::Step;

use crate::TraceReport;

/// Arrays longer than this are elided in the summary table.
const MAX_VALUES_DISPLAYED: usize = 20;

/// Generates Markdown reports from engine traces.
pub struct MarkdownGenerator<'a> {
    report: &'a TraceReport,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a new Markdown generator for the given report.
    #[must_use]
    pub const fn new(report: &'a TraceReport) -> Self {
        Self { report }
    }

    /// Generates the complete Markdown report.
    ///
    /// The step table is only written when the report carries its steps.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_summary(&mut output);
        self.write_complexity(&mut output);
        self.write_histogram(&mut output);
        self.write_steps(&mut output);
        self.write_footer(&mut output);

        output
    }

    /// Writes the report title and the algorithm description.
    fn write_title(&self, output: &mut String) {
        let info = &self.report.algorithm;
        let _ = writeln!(output, "# Sorting Trace: {}\n", info.name);
        let _ = writeln!(output, "{}\n", info.description);
    }

    /// Writes the summary section with metrics table.
    fn write_summary(&self, output: &mut String) {
        let report = self.report;
        let info = &report.algorithm;
        let stats = &report.stats;

        let _ = writeln!(output, "## Summary\n");
        let _ = writeln!(output, "| Metric | Value |");
        let _ = writeln!(output, "|--------|-------|");
        let _ = writeln!(output, "| Algorithm | {} (`{}`) |", info.name, info.id.id());
        let _ = writeln!(output, "| Difficulty | {} |", info.difficulty);
        let _ = writeln!(output, "| Elements | {} |", report.input.len());
        let _ = writeln!(output, "| Input | {} |", format_values(&report.input));
        let _ = writeln!(output, "| Output | {} |", format_values(&report.output));
        let _ = writeln!(output, "| Steps | {} |", stats.steps);
        let _ = writeln!(output, "| Comparisons | {} |", stats.comparisons);
        let _ = writeln!(output, "| Exchanges | {} |", stats.exchanges);
        let _ = writeln!(output, "| Writes | {} |", stats.writes);
        let _ = writeln!(output, "| Partitions | {} |", stats.partitions);
        let _ = writeln!(output);
    }

    /// Writes the complexity section.
    fn write_complexity(&self, output: &mut String) {
        let info = &self.report.algorithm;

        let _ = writeln!(output, "## Complexity\n");
        let _ = writeln!(output, "| Case | Time |");
        let _ = writeln!(output, "|------|------|");
        let _ = writeln!(output, "| Best | {} |", info.time_complexity.best);
        let _ = writeln!(output, "| Average | {} |", info.time_complexity.average);
        let _ = writeln!(output, "| Worst | {} |", info.time_complexity.worst);
        let _ = writeln!(output);
        let _ = writeln!(output, "**Space**: {}\n", info.space_complexity);
    }

    /// Writes the per-state step histogram.
    fn write_histogram(&self, output: &mut String) {
        let histogram = &self.report.histogram;
        let total = histogram.total();

        let _ = writeln!(output, "## Steps by State\n");
        let _ = writeln!(output, "| State | Steps | Share |");
        let _ = writeln!(output, "|-------|-------|-------|");
        for (state, count) in histogram.non_zero() {
            let share = format_share(count, total);
            let _ = writeln!(output, "| {state} | {count} | {share} |");
        }
        let _ = writeln!(output);
    }

    /// Writes the step table, if the report has steps.
    fn write_steps(&self, output: &mut String) {
        let Some(steps) = &self.report.steps else {
            return;
        };

        let _ = writeln!(output, "## Steps\n");
        let _ = writeln!(output, "| # | State | Focus | Data |");
        let _ = writeln!(output, "|---|-------|-------|------|");
        for (index, step) in steps.iter().enumerate() {
            Self::write_step_row(output, index + 1, step);
        }
        let _ = writeln!(output);
    }

    /// Writes a single step row.
    fn write_step_row(output: &mut String, number: usize, step: &Step) {
        let focus = if step.focus_indices.is_empty() {
            "-".to_string()
        } else {
            join(&step.focus_indices)
        };
        let state = step.state;
        let data = join(&step.data);
        let _ = writeln!(output, "| {number} | {state} | {focus} | {data} |");
    }

    /// Writes the report footer.
    fn write_footer(&self, output: &mut String) {
        let _ = writeln!(output, "---");
        let timestamp = format_timestamp(&self.report.generated_at);
        let _ = writeln!(output, "*Generated by sortviz at {timestamp}*");
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Joins displayable values with `", "`.
fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats an array for a table cell, eliding the tail of long arrays.
///
/// Examples:
/// - `[2, 1]` -> "2, 1"
/// - 50 values -> "v0, ..., v19, ... (50 values)"
fn format_values(values: &[f64]) -> String {
    if values.is_empty() {
        return "*empty*".to_string();
    }
    if values.len() <= MAX_VALUES_DISPLAYED {
        return join(values);
    }
    let head = join(&values[..MAX_VALUES_DISPLAYED]);
    format!("{head}, ... ({} values)", values.len())
}

/// Formats `count` as a percentage of `total` with one decimal.
fn format_share(count: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 * 100.0 / total as f64)
}

/// Formats a timestamp to a human-readable string.
///
/// Format: "YYYY-MM-DD HH:MM:SS UTC"
fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

// ============================================================================
// Tests
// ============================================================================
