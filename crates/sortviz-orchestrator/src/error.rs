//! Error types for the sortviz orchestrator.
//!
//! This module defines the error hierarchy for configuration loading, playback
//! control, and the tutor collaborator. Engine faults are wrapped from
//! [`sortviz_engine::EngineError`].

use std::path::PathBuf;

use sortviz_engine::EngineError;

/// A specialized `Result` type for orchestrator operations.
pub type Result<T> = std::result::Result<T, SortvizError>;

/// Errors that can occur while running the visualizer.
///
/// Error variants are organized by subsystem and include actionable suggestions
/// where possible.
#[derive(Debug, thiserror::Error)]
pub enum SortvizError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your sortviz.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// An engine could not be selected or constructed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    // ========================================================================
    // Playback Control Errors
    // ========================================================================
    /// Shuffle parameters are out of range.
    #[error("Invalid shuffle request: {message}\n\nSuggestion: Use a size between {min_size} and {max_size} and min <= max")]
    InvalidShuffle {
        /// What was wrong with the request.
        message: String,
        /// Smallest accepted size.
        min_size: usize,
        /// Largest accepted size.
        max_size: usize,
    },

    /// Animation speed is outside the configured bounds.
    #[error("Animation speed {ms}ms is out of range\n\nSuggestion: Use a value between {min_ms} and {max_ms} milliseconds")]
    InvalidSpeed {
        /// The requested speed.
        ms: u64,
        /// Fastest accepted speed.
        min_ms: u64,
        /// Slowest accepted speed.
        max_ms: u64,
    },

    // ========================================================================
    // Tutor Errors
    // ========================================================================
    /// The tutor service could not be reached or refused the request.
    #[error("Tutor service unavailable ({kind}): {message}\n\nSuggestion: {suggestion}")]
    TutorUnavailable {
        /// The kind of failure.
        kind: TutorErrorKind,
        /// Detailed error message.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    /// The tutor did not answer within the timeout.
    #[error("Tutor did not respond within {timeout_secs}s\n\nSuggestion: Check that the tutor service is running and responsive")]
    TutorTimeout {
        /// The timeout duration in seconds.
        timeout_secs: u64,
    },

    /// The tutor answered with a body that is not a valid response.
    #[error("Tutor returned an invalid response: {message}\n\nSuggestion: Check the tutor service version and its output format")]
    TutorResponseInvalid {
        /// Description of the problem.
        message: String,
    },

    /// No tutor service is configured.
    #[error("Tutor is not configured\n\nSuggestion: Set 'tutor.enabled' to true in sortviz.json or pass --tutor-url")]
    TutorNotConfigured,

    // ========================================================================
    // General I/O Errors
    // ========================================================================
    /// General I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Categories of tutor transport failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorErrorKind {
    /// Connection refused, DNS failure, reset.
    Network,
    /// 5xx responses.
    Server,
    /// 4xx responses.
    Rejected,
}

impl std::fmt::Display for TutorErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Server => write!(f, "server"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl TutorErrorKind {
    /// Returns a suggestion message for this error kind.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::Network => "Check that the tutor service is running and the base URL is correct",
            Self::Server => "Retry later; the tutor service may be experiencing issues",
            Self::Rejected => "Check the request payload against the tutor API",
        }
    }

    /// Classifies an HTTP status code returned by the tutor.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::Server
        } else {
            Self::Rejected
        }
    }
}

impl SortvizError {
    /// Creates a new `ConfigParseError` with the given path and message.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError` with the given message and suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `InvalidShuffle` error.
    #[must_use]
    pub fn invalid_shuffle(message: impl Into<String>, min_size: usize, max_size: usize) -> Self {
        Self::InvalidShuffle {
            message: message.into(),
            min_size,
            max_size,
        }
    }

    /// Creates a new `InvalidSpeed` error.
    #[must_use]
    pub const fn invalid_speed(ms: u64, min_ms: u64, max_ms: u64) -> Self {
        Self::InvalidSpeed { ms, min_ms, max_ms }
    }

    /// Creates a new `TutorUnavailable` error with automatic suggestion based on kind.
    #[must_use]
    pub fn tutor_unavailable(kind: TutorErrorKind, message: impl Into<String>) -> Self {
        Self::TutorUnavailable {
            kind,
            message: message.into(),
            suggestion: kind.suggestion().to_string(),
        }
    }

    /// Creates a new `TutorTimeout` error.
    #[must_use]
    pub const fn tutor_timeout(timeout_secs: u64) -> Self {
        Self::TutorTimeout { timeout_secs }
    }

    /// Creates a new `TutorResponseInvalid` error.
    #[must_use]
    pub fn tutor_response_invalid(message: impl Into<String>) -> Self {
        Self::TutorResponseInvalid {
            message: message.into(),
        }
    }

    /// Returns `true` if this error came from the tutor collaborator.
    ///
    /// Collaborator faults are expected operational conditions and are always
    /// recovered with a fallback response.
    #[must_use]
    pub const fn is_collaborator_fault(&self) -> bool {
        matches!(
            self,
            Self::TutorUnavailable { .. }
                | Self::TutorTimeout { .. }
                | Self::TutorResponseInvalid { .. }
        )
    }

    /// Returns `true` if this error indicates a caller bug rather than an
    /// operational condition.
    #[must_use]
    pub const fn is_programmer_error(&self) -> bool {
        matches!(self, Self::Engine(_))
    }

    /// Returns `true` if this error was caused by a bad request from the UI.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::Engine(_) | Self::InvalidShuffle { .. } | Self::InvalidSpeed { .. }
        )
    }

    /// Returns `true` if this error is fatal and the process should exit.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. }
        )
    }
}
