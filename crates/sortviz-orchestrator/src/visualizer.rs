//! The shared visualizer state and its merge rules.
//!
//! [`VisualizerStore`] is the single mutable value the UI renders. Engine steps
//! and tutor updates are merged into it field by field; reset and shuffle
//! replace it wholesale. Every published state keeps its focus indices inside
//! the data it is published with.

use serde::{Deserialize, Serialize};
use sortviz_engine::{validate_values, EngineError, Step, StepState};
use tracing::warn;

/// What the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerState {
    /// The array on screen.
    pub data: Vec<f64>,
    /// Highlighted indices into `data`.
    pub focus_indices: Vec<usize>,
    /// What the highlight means.
    pub state: StepState,
    /// Counter-example shown in the auxiliary panel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_case: Option<Vec<f64>>,
}

impl VisualizerState {
    /// Creates a resting state over `data`.
    #[must_use]
    pub const fn idle(data: Vec<f64>) -> Self {
        Self {
            data,
            focus_indices: Vec::new(),
            state: StepState::Idle,
            error_case: None,
        }
    }
}

/// A visualizer update submitted outside the animation cadence.
///
/// Focus and state are always replaced; `data` and `error_case` only when
/// present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizerUpdate {
    /// New highlighted indices.
    #[serde(default)]
    pub focus_indices: Vec<usize>,
    /// New semantic state.
    #[serde(default)]
    pub state: StepState,
    /// Replacement array.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<f64>>,
    /// Replacement counter-example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_case: Option<Vec<f64>>,
}

impl VisualizerUpdate {
    /// The safe default used when the tutor cannot be reached.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            focus_indices: Vec::new(),
            state: StepState::Idle,
            data: None,
            error_case: None,
        }
    }

    /// Returns `true` if the update replaces the array.
    #[must_use]
    pub const fn replaces_data(&self) -> bool {
        self.data.is_some()
    }
}

/// Owner of the [`VisualizerState`] plus its version counter.
#[derive(Debug, Clone)]
pub struct VisualizerStore {
    state: VisualizerState,
    epoch: u64,
}

impl VisualizerStore {
    /// Creates a store showing `data` at rest, at epoch 0.
    #[must_use]
    pub const fn new(data: Vec<f64>) -> Self {
        Self {
            state: VisualizerState::idle(data),
            epoch: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &VisualizerState {
        &self.state
    }

    /// Returns the current version.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Advances the version, invalidating every scheduled tick.
    pub fn bump_epoch(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Merges an engine step. `data`, focus and state change together;
    /// `error_case` is left as is.
    pub fn apply_step(&mut self, step: &Step) {
        self.state.data.clone_from(&step.data);
        self.state.focus_indices.clone_from(&step.focus_indices);
        self.state.state = step.state;
    }

    /// Merges an external update.
    ///
    /// Non-finite `data` or `error_case` rejects the whole update. Focus
    /// indices outside the resulting array are dropped; the number dropped
    /// is returned.
    pub fn apply_update(&mut self, update: &VisualizerUpdate) -> Result<usize, EngineError> {
        if let Some(data) = &update.data {
            validate_values(data)?;
        }
        if let Some(error_case) = &update.error_case {
            validate_values(error_case)?;
        }

        let len = update.data.as_ref().map_or(self.state.data.len(), Vec::len);
        let focus: Vec<usize> = update
            .focus_indices
            .iter()
            .copied()
            .filter(|&index| index < len)
            .collect();
        let dropped = update.focus_indices.len() - focus.len();
        if dropped > 0 {
            warn!(dropped, len, "Dropping out-of-range focus indices from update");
        }

        if let Some(data) = &update.data {
            self.state.data.clone_from(data);
        }
        if let Some(error_case) = &update.error_case {
            self.state.error_case = Some(error_case.clone());
        }
        self.state.focus_indices = focus;
        self.state.state = update.state;
        Ok(dropped)
    }

    /// Replaces the whole state with `data` at rest.
    pub fn replace(&mut self, data: Vec<f64>) {
        self.state = VisualizerState::idle(data);
    }
}
