//! Bubble sort without early exit.

use crate::engine::{Flow, Program};
use crate::step::Tape;

/// Pass `i` in `[0, n-1)`, cursor `j` in `[0, n-1-i)`.
#[derive(Debug, Clone)]
pub(crate) struct BubbleSort {
    len: usize,
    pass: usize,
    cursor: usize,
}

impl BubbleSort {
    pub(crate) const fn new(len: usize) -> Self {
        Self {
            len,
            pass: 0,
            cursor: 0,
        }
    }
}

impl Program for BubbleSort {
    fn advance(&mut self, tape: &mut Tape) -> Flow {
        if self.pass + 1 >= self.len {
            return Flow::Done;
        }

        let j = self.cursor;
        tape.compare(&[j, j + 1]);
        if tape.value(j) > tape.value(j + 1) {
            tape.exchange(j, j + 1);
        }

        self.cursor += 1;
        if self.cursor + 1 + self.pass >= self.len {
            self.pass += 1;
            self.cursor = 0;
        }
        Flow::Continue
    }
}
