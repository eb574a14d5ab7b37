//! The resumable engine wrapper shared by all six algorithms.
//!
//! Each algorithm is a [`Program`]: an explicit state machine that performs one
//! logical operation per [`Program::advance`] call and records the frames it
//! produced on the [`Tape`]. [`Engine`] drains those frames one at a time, so a
//! run can be suspended after any step and resumed later.

use std::iter::FusedIterator;

use crate::bubble::BubbleSort;
use crate::error::{validate_values, Result};
use crate::heap::HeapSort;
use crate::insertion::InsertionSort;
use crate::merge::MergeSort;
use crate::quick::QuickSort;
use crate::selection::SelectionSort;
use crate::step::{RunStats, Step, Tape};
use crate::Algorithm;

/// Whether a program has more work after the current operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue,
    Done,
}

/// One algorithm expressed as a step-at-a-time state machine.
///
/// An `advance` call may record zero frames (for bookkeeping transitions such
/// as popping a recursion task) but must eventually return [`Flow::Done`].
pub(crate) trait Program {
    fn advance(&mut self, tape: &mut Tape) -> Flow;
}

/// Closed dispatch over the six programs, resolved once at construction.
#[derive(Debug, Clone)]
enum Machine {
    Bubble(BubbleSort),
    Selection(SelectionSort),
    Insertion(InsertionSort),
    Merge(MergeSort),
    Quick(QuickSort),
    Heap(HeapSort),
}

impl Machine {
    fn new(algorithm: Algorithm, len: usize) -> Self {
        match algorithm {
            Algorithm::BubbleSort => Self::Bubble(BubbleSort::new(len)),
            Algorithm::SelectionSort => Self::Selection(SelectionSort::new(len)),
            Algorithm::InsertionSort => Self::Insertion(InsertionSort::new(len)),
            Algorithm::MergeSort => Self::Merge(MergeSort::new(len)),
            Algorithm::QuickSort => Self::Quick(QuickSort::new(len)),
            Algorithm::HeapSort => Self::Heap(HeapSort::new(len)),
        }
    }

    fn advance(&mut self, tape: &mut Tape) -> Flow {
        match self {
            Self::Bubble(program) => program.advance(tape),
            Self::Selection(program) => program.advance(tape),
            Self::Insertion(program) => program.advance(tape),
            Self::Merge(program) => program.advance(tape),
            Self::Quick(program) => program.advance(tape),
            Self::Heap(program) => program.advance(tape),
        }
    }
}

/// A bound, one-shot run of one sorting algorithm over a private input copy.
///
/// # Examples
///
/// ```
/// use sortviz_engine::{Algorithm, Engine, StepState};
///
/// let input = [5.0, 3.0, 8.0, 1.0];
/// let mut engine = Engine::new(Algorithm::BubbleSort, &input).unwrap();
///
/// let first = engine.next_step().unwrap();
/// assert_eq!(first.focus_indices, vec![0, 1]);
/// assert_eq!(first.state, StepState::Comparing);
///
/// let last = engine.last().unwrap();
/// assert_eq!(last.data, vec![1.0, 3.0, 5.0, 8.0]);
/// assert_eq!(input, [5.0, 3.0, 8.0, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    algorithm: Algorithm,
    tape: Tape,
    machine: Machine,
    finished: bool,
}

impl Engine {
    /// Binds a new run of `algorithm` to a copy of `input`.
    ///
    /// Fails with [`crate::EngineError::NonFiniteValue`] if any value is NaN or
    /// infinite. Empty and single-element inputs are accepted.
    pub fn new(algorithm: Algorithm, input: &[f64]) -> Result<Self> {
        validate_values(input)?;
        Ok(Self {
            algorithm,
            tape: Tape::new(input.to_vec()),
            machine: Machine::new(algorithm, input.len()),
            finished: false,
        })
    }

    /// Returns the algorithm this run executes.
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the length of the array being sorted.
    pub fn len(&self) -> usize {
        self.tape.len()
    }

    /// Returns `true` if the run is over an empty array.
    pub fn is_empty(&self) -> bool {
        self.tape.len() == 0
    }

    /// Returns counters accumulated so far.
    pub const fn stats(&self) -> RunStats {
        self.tape.stats()
    }

    /// Returns `true` once the terminal step has been handed out.
    pub fn is_exhausted(&self) -> bool {
        self.finished && self.tape.is_drained()
    }

    /// Produces the next step, or `None` once the run is exhausted.
    pub fn next_step(&mut self) -> Option<Step> {
        loop {
            if let Some(step) = self.tape.pop() {
                return Some(step);
            }
            if self.finished {
                return None;
            }
            if self.machine.advance(&mut self.tape) == Flow::Done {
                self.finished = true;
                self.tape.finish();
            }
        }
    }
}

impl Iterator for Engine {
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_step()
    }
}

impl FusedIterator for Engine {}
