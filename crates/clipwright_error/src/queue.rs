//! Job queue errors.

/// Error type for queue operations (claim, complete, fail).
///
/// # Examples
///
/// ```
/// use clipwright_error::QueueError;
///
/// let err = QueueError::new("unknown job id 42");
/// assert!(format!("{}", err).contains("42"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Queue Error: {} at line {} in {}", message, line, file)]
pub struct QueueError {
    /// Description of the queue problem
    pub message: String,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl QueueError {
    /// Create a new QueueError with automatic location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
