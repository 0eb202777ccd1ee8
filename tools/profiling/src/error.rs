//! Error types for the profiler.

use thiserror::Error;

/// Result type alias for profiling operations.
pub type Result<T> = std::result::Result<T, ProfilingError>;

/// Errors raised by a profiling session and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfilingError {
    /// Operation requires a different session state
    #[error("invalid session state: {0}")]
    InvalidState(String),

    /// A tracking call received a malformed input
    #[error("invalid argument '{field}': {reason}")]
    InvalidArgument { field: String, reason: String },

    /// The memory sampler could not query the process
    #[error("memory collector unavailable for process {pid}: {reason}")]
    CollectorUnavailable { pid: u32, reason: String },

    /// A `/proc` status line could not be parsed
    #[error("failed to parse metrics: {0}")]
    MetricsParseError(String),

    /// Configuration failed validation or parsing
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProfilingError {
    /// Session has not been started yet.
    pub fn not_started() -> Self {
        Self::InvalidState("session not started".to_string())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a collector unavailable error.
    pub fn collector_unavailable(pid: u32, reason: impl Into<String>) -> Self {
        Self::CollectorUnavailable {
            pid,
            reason: reason.into(),
        }
    }
}
