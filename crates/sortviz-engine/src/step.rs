//! The step model shared by every engine and by the visualizer.
//!
//! A [`Step`] is one animation frame: a full copy of the array, the indices
//! under comparison or exchange, and a semantic tag telling the renderer what
//! those indices mean.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// ============================================================================
// StepState
// ============================================================================

/// Semantic tag attached to a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// The focused indices are being compared.
    Comparing,
    /// The focused indices are being exchanged or written.
    Swapping,
    /// The run is complete and the array is sorted.
    Sorted,
    /// Nothing is happening; the resting display state.
    #[default]
    Idle,
    /// Counter-example highlight requested by the tutor.
    ///
    /// Engines never emit this state.
    Error,
}

impl StepState {
    /// Returns the lowercase wire name of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comparing => "comparing",
            Self::Swapping => "swapping",
            Self::Sorted => "sorted",
            Self::Idle => "idle",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Step
// ============================================================================

/// One immutable animation frame produced by an engine.
///
/// `data` is always an owned snapshot, so retaining old steps never aliases
/// the engine's working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// Full array snapshot at this instant.
    pub data: Vec<f64>,
    /// Zero, one or two indices into `data` currently in focus.
    pub focus_indices: Vec<usize>,
    /// What the focused indices mean.
    pub state: StepState,
}

impl Step {
    /// Creates a step from its parts.
    #[must_use]
    pub const fn new(data: Vec<f64>, focus_indices: Vec<usize>, state: StepState) -> Self {
        Self {
            data,
            focus_indices,
            state,
        }
    }

    /// Creates the terminal `sorted` step for the given array.
    #[must_use]
    pub const fn sorted(data: Vec<f64>) -> Self {
        Self::new(data, Vec::new(), StepState::Sorted)
    }

    /// Returns `true` if this is the terminal frame of a run.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortviz_engine::{Step, StepState};
    ///
    /// assert!(Step::sorted(vec![1.0, 2.0]).is_terminal());
    /// assert!(!Step::new(vec![2.0, 1.0], vec![0, 1], StepState::Comparing).is_terminal());
    /// ```
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state == StepState::Sorted && self.focus_indices.is_empty()
    }
}

// ============================================================================
// RunStats
// ============================================================================

/// Counters accumulated while an engine runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Steps handed out so far, terminal step included.
    pub steps: u64,
    /// Comparing steps emitted.
    pub comparisons: u64,
    /// Two-index exchanges (each one an intent/result pair of steps).
    pub exchanges: u64,
    /// Single-index writes (insertion shifts and merge placements).
    pub writes: u64,
    /// Partition passes started (quick sort only).
    pub partitions: u64,
}

// ============================================================================
// Tape
// ============================================================================

/// Private working copy plus the frames produced by the current operation.
///
/// Every emitting method clones the working array into the frame, so a frame
/// never observes later mutation.
#[derive(Debug, Clone)]
pub(crate) struct Tape {
    data: Vec<f64>,
    pending: VecDeque<Step>,
    stats: RunStats,
}

impl Tape {
    pub(crate) fn new(data: Vec<f64>) -> Self {
        Self {
            data,
            pending: VecDeque::with_capacity(3),
            stats: RunStats::default(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn value(&self, index: usize) -> f64 {
        self.data[index]
    }

    pub(crate) fn values(&self, range: std::ops::RangeInclusive<usize>) -> Vec<f64> {
        self.data[range].to_vec()
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Emits a `comparing` frame over `focus`.
    pub(crate) fn compare(&mut self, focus: &[usize]) {
        self.stats.comparisons += 1;
        self.emit(focus, StepState::Comparing);
    }

    /// Emits the intent frame, exchanges `a` and `b`, then emits the result frame.
    pub(crate) fn exchange(&mut self, a: usize, b: usize) {
        self.emit(&[a, b], StepState::Swapping);
        self.data.swap(a, b);
        self.stats.exchanges += 1;
        self.emit(&[a, b], StepState::Swapping);
    }

    /// Stores `value` at `index` and emits a `swapping` frame over `focus`.
    pub(crate) fn write(&mut self, index: usize, value: f64, focus: &[usize]) {
        self.data[index] = value;
        self.stats.writes += 1;
        self.emit(focus, StepState::Swapping);
    }

    /// Stores `value` at `index` without emitting a frame.
    pub(crate) fn place(&mut self, index: usize, value: f64) {
        self.data[index] = value;
    }

    pub(crate) fn note_partition(&mut self) {
        self.stats.partitions += 1;
    }

    /// Emits the terminal `sorted` frame.
    pub(crate) fn finish(&mut self) {
        self.emit(&[], StepState::Sorted);
    }

    /// Hands out the oldest pending frame.
    pub(crate) fn pop(&mut self) -> Option<Step> {
        let step = self.pending.pop_front()?;
        self.stats.steps += 1;
        Some(step)
    }

    fn emit(&mut self, focus: &[usize], state: StepState) {
        self.pending
            .push_back(Step::new(self.data.clone(), focus.to_vec(), state));
    }
}
