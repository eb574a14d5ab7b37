//! Quick sort with Lomuto partitioning and a last-element pivot.
//!
//! Every non-empty range is partitioned, including single-element ranges, so
//! an already sorted input of length `n` performs `n` partitions. The pivot is
//! never randomized.

use crate::engine::{Flow, Program};
use crate::step::Tape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Announce the pivot.
    Entry,
    /// Compare `scan` against the pivot.
    Scan,
    /// Move the pivot to `store`.
    Place,
}

/// A partition in progress over `[low, high]`.
#[derive(Debug, Clone)]
struct Partition {
    low: usize,
    high: usize,
    pivot: f64,
    store: usize,
    scan: usize,
    phase: Phase,
}

impl Partition {
    const fn new(low: usize, high: usize) -> Self {
        Self {
            low,
            high,
            pivot: 0.0,
            store: low,
            scan: low,
            phase: Phase::Entry,
        }
    }

    /// Runs one operation. Returns the pivot's final index once placed.
    fn step(&mut self, tape: &mut Tape) -> Option<usize> {
        match self.phase {
            Phase::Entry => {
                tape.note_partition();
                tape.compare(&[self.high]);
                self.pivot = tape.value(self.high);
                self.phase = Phase::Scan;
                None
            }
            Phase::Scan if self.scan < self.high => {
                let j = self.scan;
                tape.compare(&[j, self.high]);
                if tape.value(j) <= self.pivot {
                    if self.store != j {
                        tape.exchange(self.store, j);
                    }
                    self.store += 1;
                }
                self.scan += 1;
                None
            }
            Phase::Scan => {
                self.phase = Phase::Place;
                None
            }
            Phase::Place => {
                if self.store != self.high {
                    tape.exchange(self.store, self.high);
                }
                Some(self.store)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct QuickSort {
    ranges: Vec<(usize, usize)>,
    active: Option<Partition>,
}

impl QuickSort {
    pub(crate) fn new(len: usize) -> Self {
        let mut ranges = Vec::new();
        if len > 1 {
            ranges.push((0, len - 1));
        }
        Self {
            ranges,
            active: None,
        }
    }
}

impl Program for QuickSort {
    fn advance(&mut self, tape: &mut Tape) -> Flow {
        if let Some(partition) = self.active.as_mut() {
            if let Some(pivot) = partition.step(tape) {
                let (low, high) = (partition.low, partition.high);
                self.active = None;
                // Right first so the left partition is sorted first.
                if pivot < high {
                    self.ranges.push((pivot + 1, high));
                }
                if pivot > low {
                    self.ranges.push((low, pivot - 1));
                }
            }
            return Flow::Continue;
        }

        match self.ranges.pop() {
            Some((low, high)) => {
                self.active = Some(Partition::new(low, high));
                Flow::Continue
            }
            None => Flow::Done,
        }
    }
}
