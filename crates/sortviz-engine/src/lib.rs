//! sortviz Engines
//!
//! Step-generating sorting engines for the sortviz animation core.
//!
//! Each of the six algorithms runs as a resumable state machine over a private
//! copy of its input and yields one [`Step`] (an animation frame) at a time.
//! Engines are synchronous and perform no I/O; the orchestrator drives them at
//! a configurable cadence.

mod algorithm;
mod bubble;
mod engine;
mod error;
mod heap;
mod insertion;
mod merge;
mod quick;
mod selection;
mod step;

pub use algorithm::{Algorithm, AlgorithmInfo, Complexity, Difficulty};
pub use engine::Engine;
pub use error::{validate_values, EngineError, Result};
pub use step::{RunStats, Step, StepState};

/// Runs `algorithm` over `input` to completion and returns every step.
///
/// The returned trace always ends with the terminal `sorted` step.
///
/// # Examples
///
/// ```
/// use sortviz_engine::{trace, Algorithm};
///
/// let steps = trace(Algorithm::InsertionSort, &[2.0, 1.0]).unwrap();
/// assert_eq!(steps.last().unwrap().data, vec![1.0, 2.0]);
/// ```
pub fn trace(algorithm: Algorithm, input: &[f64]) -> Result<Vec<Step>> {
    Ok(Engine::new(algorithm, input)?.collect())
}
