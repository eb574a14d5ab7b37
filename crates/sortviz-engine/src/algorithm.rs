//! Algorithm identifiers and catalogue metadata.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// The six supported sorting algorithms.
///
/// The wire id of each variant is its camelCase name (`bubbleSort`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    /// Adjacent-pair exchange sort.
    #[default]
    BubbleSort,
    /// Minimum-selection sort.
    SelectionSort,
    /// Shift-based insertion sort.
    InsertionSort,
    /// Top-down merge sort.
    MergeSort,
    /// Quick sort with Lomuto partitioning.
    QuickSort,
    /// Max-heap sort.
    HeapSort,
}

impl Algorithm {
    /// Every algorithm, in catalogue order.
    pub const ALL: [Self; 6] = [
        Self::BubbleSort,
        Self::SelectionSort,
        Self::InsertionSort,
        Self::MergeSort,
        Self::QuickSort,
        Self::HeapSort,
    ];

    /// Returns the wire id of the algorithm.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::BubbleSort => "bubbleSort",
            Self::SelectionSort => "selectionSort",
            Self::InsertionSort => "insertionSort",
            Self::MergeSort => "mergeSort",
            Self::QuickSort => "quickSort",
            Self::HeapSort => "heapSort",
        }
    }

    /// Returns catalogue metadata for the algorithm.
    ///
    /// # Examples
    ///
    /// ```
    /// use sortviz_engine::{Algorithm, Difficulty};
    ///
    /// let info = Algorithm::QuickSort.info();
    /// assert_eq!(info.name, "Quick Sort");
    /// assert_eq!(info.time_complexity.worst, "O(n²)");
    /// assert_eq!(info.difficulty, Difficulty::Intermediate);
    /// ```
    #[must_use]
    pub const fn info(&self) -> AlgorithmInfo {
        match self {
            Self::BubbleSort => AlgorithmInfo {
                id: *self,
                name: "Bubble Sort",
                description: "Repeatedly steps through the list, compares adjacent elements and swaps them if they are in the wrong order.",
                time_complexity: Complexity::new("O(n²)", "O(n²)", "O(n²)"),
                space_complexity: "O(1)",
                difficulty: Difficulty::Beginner,
            },
            Self::SelectionSort => AlgorithmInfo {
                id: *self,
                name: "Selection Sort",
                description: "Splits the list into a sorted prefix and an unsorted suffix, and repeatedly moves the smallest unsorted element to the end of the prefix.",
                time_complexity: Complexity::new("O(n²)", "O(n²)", "O(n²)"),
                space_complexity: "O(1)",
                difficulty: Difficulty::Beginner,
            },
            Self::InsertionSort => AlgorithmInfo {
                id: *self,
                name: "Insertion Sort",
                description: "Builds the sorted array one item at a time, shifting larger elements right to open a slot for each new key.",
                time_complexity: Complexity::new("O(n)", "O(n²)", "O(n²)"),
                space_complexity: "O(1)",
                difficulty: Difficulty::Beginner,
            },
            Self::MergeSort => AlgorithmInfo {
                id: *self,
                name: "Merge Sort",
                description: "Divides the array into two halves, sorts each half recursively, then merges the sorted halves.",
                time_complexity: Complexity::new("O(n log n)", "O(n log n)", "O(n log n)"),
                space_complexity: "O(n)",
                difficulty: Difficulty::Intermediate,
            },
            Self::QuickSort => AlgorithmInfo {
                id: *self,
                name: "Quick Sort",
                description: "Partitions the array around its last element, then sorts the two partitions recursively.",
                time_complexity: Complexity::new("O(n log n)", "O(n log n)", "O(n²)"),
                space_complexity: "O(log n)",
                difficulty: Difficulty::Intermediate,
            },
            Self::HeapSort => AlgorithmInfo {
                id: *self,
                name: "Heap Sort",
                description: "Builds a max heap, then repeatedly moves the root to the end of the unsorted region and restores the heap.",
                time_complexity: Complexity::new("O(n log n)", "O(n log n)", "O(n log n)"),
                space_complexity: "O(1)",
                difficulty: Difficulty::Advanced,
            },
        }
    }

    /// Parses an algorithm id, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.id().to_lowercase() == wanted)
    }
}

impl FromStr for Algorithm {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_case_insensitive(s).ok_or_else(|| EngineError::unknown_algorithm(s))
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// How hard an algorithm is for a newcomer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// First algorithms a learner meets.
    Beginner,
    /// Divide-and-conquer algorithms.
    Intermediate,
    /// Algorithms built on auxiliary structures.
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Beginner => write!(f, "beginner"),
            Self::Intermediate => write!(f, "intermediate"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

/// Best, average and worst case time complexity in big-O notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Complexity {
    /// Best case.
    pub best: &'static str,
    /// Average case.
    pub average: &'static str,
    /// Worst case.
    pub worst: &'static str,
}

impl Complexity {
    const fn new(best: &'static str, average: &'static str, worst: &'static str) -> Self {
        Self {
            best,
            average,
            worst,
        }
    }
}

/// Catalogue entry describing one algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmInfo {
    /// The algorithm this entry describes.
    pub id: Algorithm,
    /// Human-readable name.
    pub name: &'static str,
    /// One-sentence description.
    pub description: &'static str,
    /// Time complexity of the emitted trace.
    pub time_complexity: Complexity,
    /// Auxiliary space.
    pub space_complexity: &'static str,
    /// Learner difficulty.
    pub difficulty: Difficulty,
}
