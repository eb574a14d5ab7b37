//! Heap sort: bottom-up max-heap construction followed by root extraction.

use crate::engine::{Flow, Program};
use crate::step::Tape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Left,
    Right,
    Settle,
}

/// One sift-down in progress within the first `size` elements.
#[derive(Debug, Clone)]
struct Sift {
    size: usize,
    node: usize,
    largest: usize,
    stage: Stage,
}

impl Sift {
    const fn new(size: usize, node: usize) -> Self {
        Self {
            size,
            node,
            largest: node,
            stage: Stage::Left,
        }
    }

    fn check_child(&mut self, tape: &mut Tape, child: usize) {
        if child < self.size {
            tape.compare(&[self.largest, child]);
            if tape.value(child) > tape.value(self.largest) {
                self.largest = child;
            }
        }
    }

    /// Runs one operation. Returns `false` once the node has settled.
    fn step(&mut self, tape: &mut Tape) -> bool {
        match self.stage {
            Stage::Left => {
                self.check_child(tape, 2 * self.node + 1);
                self.stage = Stage::Right;
                true
            }
            Stage::Right => {
                self.check_child(tape, 2 * self.node + 2);
                self.stage = Stage::Settle;
                true
            }
            Stage::Settle if self.largest != self.node => {
                tape.exchange(self.node, self.largest);
                *self = Self::new(self.size, self.largest);
                true
            }
            Stage::Settle => false,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HeapSort {
    /// Heapify calls left in the build phase; the next node is `build - 1`.
    build: usize,
    /// Last index of the unsorted region.
    end: usize,
    sift: Option<Sift>,
}

impl HeapSort {
    pub(crate) const fn new(len: usize) -> Self {
        Self {
            build: len / 2,
            end: len.saturating_sub(1),
            sift: None,
        }
    }
}

impl Program for HeapSort {
    fn advance(&mut self, tape: &mut Tape) -> Flow {
        if let Some(sift) = self.sift.as_mut() {
            if !sift.step(tape) {
                self.sift = None;
            }
            return Flow::Continue;
        }

        if self.build > 0 {
            self.build -= 1;
            self.sift = Some(Sift::new(tape.len(), self.build));
            return Flow::Continue;
        }

        if self.end > 0 {
            tape.exchange(0, self.end);
            self.sift = Some(Sift::new(self.end, 0));
            self.end -= 1;
            return Flow::Continue;
        }

        Flow::Done
    }
}
