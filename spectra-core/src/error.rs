//! # Error Module
//!
//! Every fallible operation in the core returns [`FftError`]. Validation
//! failures are raised before any arithmetic starts; collective failures
//! abort a whole distributed round.

use thiserror::Error;

/// Errors returned by the transform back-ends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FftError {
    /// The input violates a precondition (length not a power of two,
    /// bad worker rank or worker count).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A broadcast or gather did not complete for every participant.
    #[error("collective {op} failed: {reason}")]
    CollectiveFailure { op: &'static str, reason: String },

    /// The dedicated worker pool could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl FftError {
    pub(crate) fn collective(op: &'static str, reason: impl Into<String>) -> Self {
        FftError::CollectiveFailure {
            op,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FftError>;
