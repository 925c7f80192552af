//! Cooperative cancellation signal.
//!
//! A terminated job must stop at the next liveness checkpoint. This error
//! family is never retried and never recorded as a per-unit business failure;
//! every intermediate catch boundary re-raises it unchanged.

/// Why a running task is no longer live.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TerminatedErrorKind {
    /// The task was cancelled by an external request
    #[display("task {} was cancelled at checkpoint '{}'", task_id, checkpoint)]
    Cancelled {
        /// The cancelled task id
        task_id: String,
        /// Checkpoint label where the cancellation was observed
        checkpoint: String,
    },
    /// A newer task for the same dedupe key replaced this one
    #[display("task {} was superseded by {} at checkpoint '{}'", task_id, superseded_by, checkpoint)]
    Superseded {
        /// The stale task id
        task_id: String,
        /// The task id that replaced it
        superseded_by: String,
        /// Checkpoint label where the supersession was observed
        checkpoint: String,
    },
}

/// Error type carrying the cancellation signal.
///
/// # Examples
///
/// ```
/// use clipwright_error::{TerminatedError, TerminatedErrorKind};
///
/// let err = TerminatedError::new(TerminatedErrorKind::Cancelled {
///     task_id: "t-1".to_string(),
///     checkpoint: "before-step".to_string(),
/// });
/// assert!(format!("{}", err).contains("cancelled"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Terminated: {} at line {} in {}", kind, line, file)]
pub struct TerminatedError {
    /// The specific termination condition
    pub kind: TerminatedErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TerminatedError {
    /// Create a new TerminatedError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TerminatedErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
