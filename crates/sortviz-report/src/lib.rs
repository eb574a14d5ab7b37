//! sortviz Report Generation
//!
//! This crate runs one engine offline and summarises the trace it produced.
//! Reports can be serialized to JSON for programmatic access or rendered to
//! Markdown for human consumption.
//!
//! # Types
//!
//! - [`TraceReport`] - Algorithm metadata, input, output and counters for one run
//! - [`StateHistogram`] - Number of steps emitted in each state
//!
//! # Generators
//!
//! - [`json::JsonGenerator`] - Generate JSON reports with compact or pretty formatting
//! - [`MarkdownGenerator`] - Generate human-readable Markdown reports
//!
//! # Example
//!
//! ```rust
//! use sortviz_engine::Algorithm;
//! use sortviz_report::TraceReport;
//! use sortviz_report::json::JsonGenerator;
//!
//! let report = TraceReport::build(Algorithm::MergeSort, &[5.0, 3.0, 8.0, 1.0], false).unwrap();
//! assert_eq!(report.output, vec![1.0, 3.0, 5.0, 8.0]);
//!
//! let json = JsonGenerator::new(&report).generate_pretty().unwrap();
//! assert!(json.contains("\"mergeSort\""));
//! ```

pub mod json;
mod markdown;

pub use markdown::MarkdownGenerator;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sortviz_engine::{Algorithm, AlgorithmInfo, Engine, EngineError, RunStats, Step, StepState};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The engine refused the input.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to read or write report files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// State Histogram
// ============================================================================

/// Number of steps emitted in each [`StepState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StateHistogram {
    /// `comparing` steps.
    pub comparing: u64,
    /// `swapping` steps.
    pub swapping: u64,
    /// `sorted` steps.
    pub sorted: u64,
    /// `idle` steps.
    pub idle: u64,
    /// `error` steps.
    pub error: u64,
}

impl StateHistogram {
    /// Counts one step in `state`.
    pub fn record(&mut self, state: StepState) {
        *self.slot(state) += 1;
    }

    /// Returns the count for `state`.
    #[must_use]
    pub const fn get(&self, state: StepState) -> u64 {
        match state {
            StepState::Comparing => self.comparing,
            StepState::Swapping => self.swapping,
            StepState::Sorted => self.sorted,
            StepState::Idle => self.idle,
            StepState::Error => self.error,
        }
    }

    /// Returns the states with at least one step, in a fixed order.
    pub fn non_zero(&self) -> impl Iterator<Item = (StepState, u64)> + '_ {
        [
            StepState::Comparing,
            StepState::Swapping,
            StepState::Sorted,
            StepState::Idle,
            StepState::Error,
        ]
        .into_iter()
        .map(|state| (state, self.get(state)))
        .filter(|&(_, count)| count > 0)
    }

    /// Total number of steps counted.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.comparing + self.swapping + self.sorted + self.idle + self.error
    }

    fn slot(&mut self, state: StepState) -> &mut u64 {
        match state {
            StepState::Comparing => &mut self.comparing,
            StepState::Swapping => &mut self.swapping,
            StepState::Sorted => &mut self.sorted,
            StepState::Idle => &mut self.idle,
            StepState::Error => &mut self.error,
        }
    }
}

// ============================================================================
// Trace Report
// ============================================================================

/// Summary of one engine run from input to the terminal `sorted` step.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceReport {
    /// Catalogue entry of the algorithm that ran.
    pub algorithm: AlgorithmInfo,

    /// The array the engine started from.
    pub input: Vec<f64>,

    /// The array carried by the terminal step.
    pub output: Vec<f64>,

    /// Counters accumulated by the engine.
    pub stats: RunStats,

    /// Steps per state.
    pub histogram: StateHistogram,

    /// Every step, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<Step>>,

    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
}

impl TraceReport {
    /// Runs `algorithm` over `input` to completion and summarises the trace.
    ///
    /// With `include_steps`, the full step list is kept in the report.
    pub fn build(algorithm: Algorithm, input: &[f64], include_steps: bool) -> Result<Self> {
        let mut engine = Engine::new(algorithm, input)?;
        let mut histogram = StateHistogram::default();
        let mut steps = Vec::new();
        let mut output = input.to_vec();

        for step in engine.by_ref() {
            histogram.record(step.state);
            if step.is_terminal() {
                output.clone_from(&step.data);
            }
            if include_steps {
                steps.push(step);
            }
        }

        Ok(Self {
            algorithm: algorithm.info(),
            input: input.to_vec(),
            output,
            stats: engine.stats(),
            histogram,
            steps: include_steps.then_some(steps),
            generated_at: Utc::now(),
        })
    }

    /// Number of steps the engine emitted, terminal step included.
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.stats.steps
    }

    /// Serializes the report to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        json::JsonGenerator::new(self).generate_pretty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_bubble_report() {
        let report = TraceReport::build(Algorithm::BubbleSort, &[2.0, 1.0], true).unwrap();

        assert_eq!(report.algorithm.name, "Bubble Sort");
        assert_eq!(report.input, vec![2.0, 1.0]);
        assert_eq!(report.output, vec![1.0, 2.0]);
        assert_eq!(report.step_count(), 4);
        assert_eq!(report.stats.comparisons, 1);
        assert_eq!(report.stats.exchanges, 1);
        assert_eq!(report.histogram.comparing, 1);
        assert_eq!(report.histogram.swapping, 2);
        assert_eq!(report.histogram.sorted, 1);
        assert_eq!(report.steps.as_ref().unwrap().len(), 4);
    }

    #[test]
    fn test_histogram_total_matches_step_count() {
        for algorithm in Algorithm::ALL {
            let report =
                TraceReport::build(algorithm, &[9.0, 4.0, 7.0, 1.0, 4.0, 3.0], false).unwrap();
            assert_eq!(report.histogram.total(), report.step_count(), "{algorithm}");
            assert_eq!(report.histogram.sorted, 1, "{algorithm}");
            assert_eq!(report.output, vec![1.0, 3.0, 4.0, 4.0, 7.0, 9.0]);
            assert!(report.steps.is_none());
        }
    }

    #[test]
    fn test_empty_input() {
        let report = TraceReport::build(Algorithm::QuickSort, &[], false).unwrap();
        assert!(report.output.is_empty());
        assert_eq!(report.step_count(), 1);
        assert_eq!(report.histogram.non_zero().collect::<Vec<_>>(), vec![(StepState::Sorted, 1)]);
    }

    #[test]
    fn test_non_finite_input_is_rejected() {
        let err = TraceReport::build(Algorithm::HeapSort, &[1.0, f64::INFINITY], false).unwrap_err();
        assert!(matches!(err, ReportError::Engine(_)));
    }

    #[test]
    fn test_to_json_uses_camel_case() {
        let report = TraceReport::build(Algorithm::InsertionSort, &[3.0, 2.0, 1.0], false).unwrap();
        let json = report.to_json().unwrap();
        assert!(json.contains("\"generatedAt\""));
        assert!(json.contains("\"timeComplexity\""));
        assert!(!json.contains("\"steps\": ["));
    }
}
