//! Error types for the sorting engines.
//!
//! Engine faults are programmer errors: they are raised when an engine is
//! constructed, never in the middle of a run.

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while selecting or constructing an engine.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The input contains NaN or an infinity.
    #[error("Input value at index {index} is not a finite number ({value})\n\nSuggestion: Remove NaN or infinite values before starting a run")]
    NonFiniteValue {
        /// Position of the offending value.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// The algorithm id does not name one of the supported engines.
    #[error("Unknown sorting algorithm '{id}'\n\nSuggestion: Use one of: {expected}")]
    UnknownAlgorithm {
        /// The id that was requested.
        id: String,
        /// Comma-separated list of accepted ids.
        expected: String,
    },
}

impl EngineError {
    /// Creates a new `NonFiniteValue` error.
    #[must_use]
    pub const fn non_finite(index: usize, value: f64) -> Self {
        Self::NonFiniteValue { index, value }
    }

    /// Creates a new `UnknownAlgorithm` error listing every accepted id.
    #[must_use]
    pub fn unknown_algorithm(id: impl Into<String>) -> Self {
        let expected = crate::Algorithm::ALL
            .iter()
            .map(|algorithm| algorithm.id())
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnknownAlgorithm {
            id: id.into(),
            expected,
        }
    }
}

/// Checks that every value is finite.
///
/// Returns the first offending index as an error.
pub fn validate_values(values: &[f64]) -> Result<()> {
    match values.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(EngineError::non_finite(index, values[index])),
        None => Ok(()),
    }
}
