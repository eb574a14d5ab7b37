//! Insertion sort with shift steps.
//!
//! Each shift is shown as a `comparing` frame followed by a `swapping` frame
//! over the same pair, even though only the right-hand slot is assigned. The
//! key itself is written back without a frame of its own.

use crate::engine::{Flow, Program};
use crate::step::Tape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Pick up the key at `next`.
    Select,
    /// Shift larger elements right until the hole finds its place.
    Shift,
}

#[derive(Debug, Clone)]
pub(crate) struct InsertionSort {
    len: usize,
    next: usize,
    hole: usize,
    key: f64,
    phase: Phase,
}

impl InsertionSort {
    pub(crate) const fn new(len: usize) -> Self {
        Self {
            len,
            next: 1,
            hole: 0,
            key: 0.0,
            phase: Phase::Select,
        }
    }
}

impl Program for InsertionSort {
    fn advance(&mut self, tape: &mut Tape) -> Flow {
        match self.phase {
            Phase::Select => {
                if self.next >= self.len {
                    return Flow::Done;
                }
                self.key = tape.value(self.next);
                self.hole = self.next;
                tape.compare(&[self.next]);
                self.phase = Phase::Shift;
            }
            Phase::Shift => {
                let hole = self.hole;
                if hole > 0 && tape.value(hole - 1) > self.key {
                    let focus = [hole - 1, hole];
                    let shifted = tape.value(hole - 1);
                    tape.compare(&focus);
                    tape.write(hole, shifted, &focus);
                    self.hole -= 1;
                } else {
                    tape.place(hole, self.key);
                    self.next += 1;
                    self.phase = Phase::Select;
                }
            }
        }
        Flow::Continue
    }
}
