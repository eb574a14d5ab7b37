//! Top-down merge sort driven by an explicit task stack.
//!
//! Splitting emits nothing. Each merge placement is a `comparing` frame over
//! `(low + i, mid + 1 + j)` followed by a `swapping` frame on the destination
//! index; the drain loops emit only the `swapping` frame.

use crate::engine::{Flow, Program};
use crate::step::Tape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    Sort { low: usize, high: usize },
    Merge { low: usize, mid: usize, high: usize },
}

/// A merge in progress over `[low, high]`.
#[derive(Debug, Clone)]
struct Merging {
    left: Vec<f64>,
    right: Vec<f64>,
    low: usize,
    mid: usize,
    i: usize,
    j: usize,
    dest: usize,
}

impl Merging {
    fn new(tape: &Tape, low: usize, mid: usize, high: usize) -> Self {
        Self {
            left: tape.values(low..=mid),
            right: tape.values(mid + 1..=high),
            low,
            mid,
            i: 0,
            j: 0,
            dest: low,
        }
    }

    /// Places one element. Returns `false` once both runs are drained.
    fn place_next(&mut self, tape: &mut Tape) -> bool {
        let value = match (self.left.get(self.i), self.right.get(self.j)) {
            (Some(&left), Some(&right)) => {
                tape.compare(&[self.low + self.i, self.mid + 1 + self.j]);
                if left <= right {
                    self.i += 1;
                    left
                } else {
                    self.j += 1;
                    right
                }
            }
            (Some(&left), None) => {
                self.i += 1;
                left
            }
            (None, Some(&right)) => {
                self.j += 1;
                right
            }
            (None, None) => return false,
        };
        tape.write(self.dest, value, &[self.dest]);
        self.dest += 1;
        true
    }
}

#[derive(Debug, Clone)]
pub(crate) struct MergeSort {
    tasks: Vec<Task>,
    active: Option<Merging>,
}

impl MergeSort {
    pub(crate) fn new(len: usize) -> Self {
        let mut tasks = Vec::new();
        if len > 1 {
            tasks.push(Task::Sort {
                low: 0,
                high: len - 1,
            });
        }
        Self {
            tasks,
            active: None,
        }
    }
}

impl Program for MergeSort {
    fn advance(&mut self, tape: &mut Tape) -> Flow {
        if let Some(merging) = self.active.as_mut() {
            if merging.place_next(tape) {
                return Flow::Continue;
            }
            self.active = None;
        }

        match self.tasks.pop() {
            None => Flow::Done,
            Some(Task::Sort { low, high }) => {
                if low < high {
                    let mid = low + (high - low) / 2;
                    // Pushed in reverse so the left half runs first.
                    self.tasks.push(Task::Merge { low, mid, high });
                    self.tasks.push(Task::Sort { low: mid + 1, high });
                    self.tasks.push(Task::Sort { low, high: mid });
                }
                Flow::Continue
            }
            Some(Task::Merge { low, mid, high }) => {
                self.active = Some(Merging::new(tape, low, mid, high));
                Flow::Continue
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::{Algorithm, Engine, Step, StepState};

    fn trace(input: &[f64]) -> Vec<Step> {
        Engine::new(Algorithm::MergeSort, input).unwrap().collect()
    }

    #[test]
    fn test_two_element_trace() {
        let steps = trace(&[2.0, 1.0]);
        assert_eq!(
            steps,
            vec![
                Step::new(vec![2.0, 1.0], vec![0, 1], StepState::Comparing),
                Step::new(vec![1.0, 1.0], vec![0], StepState::Swapping),
                Step::new(vec![1.0, 2.0], vec![1], StepState::Swapping),
                Step::sorted(vec![1.0, 2.0]),
            ]
        );
    }

    #[test]
    fn test_every_placement_writes_single_index() {
        let steps = trace(&[38.0, 27.0, 43.0, 3.0, 9.0, 82.0, 10.0]);
        for step in steps.iter().filter(|s| s.state == StepState::Swapping) {
            assert_eq!(step.focus_indices.len(), 1);
        }
        // One write per element per merge level.
        let writes = steps
            .iter()
            .filter(|s| s.state == StepState::Swapping)
            .count();
        assert_eq!(writes, 7 + 7 + 6);
        assert_eq!(
            steps.last().unwrap().data,
            vec![3.0, 9.0, 10.0, 27.0, 38.0, 43.0, 82.0]
        );
    }

    #[test]
    fn test_left_half_is_merged_first() {
        let steps = trace(&[4.0, 3.0, 2.0, 1.0]);
        assert_eq!(steps[0].focus_indices, vec![0, 1]);
        assert_eq!(steps[0].state, StepState::Comparing);
        // Right half [2, 3] is compared only after the left pair is placed.
        assert_eq!(steps[3].focus_indices, vec![2, 3]);
    }
}
