//! Selection sort.

use crate::engine::{Flow, Program};
use crate::step::Tape;

#[derive(Debug, Clone)]
pub(crate) struct SelectionSort {
    len: usize,
    start: usize,
    scan: usize,
    min: usize,
}

impl SelectionSort {
    pub(crate) const fn new(len: usize) -> Self {
        Self {
            len,
            start: 0,
            scan: 1,
            min: 0,
        }
    }
}

impl Program for SelectionSort {
    fn advance(&mut self, tape: &mut Tape) -> Flow {
        if self.start + 1 >= self.len {
            return Flow::Done;
        }

        if self.scan < self.len {
            tape.compare(&[self.min, self.scan]);
            if tape.value(self.scan) < tape.value(self.min) {
                self.min = self.scan;
            }
            self.scan += 1;
            return Flow::Continue;
        }

        // Scan finished: move the minimum into place.
        if self.min != self.start {
            tape.exchange(self.start, self.min);
        }
        self.start += 1;
        self.scan = self.start + 1;
        self.min = self.start;
        Flow::Continue
    }
}
