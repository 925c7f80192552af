//! Top-level error wrapper types.

use crate::{
    CompletionError, ConfigError, DatabaseError, JsonParseError, QueueError, TaskError,
    TerminatedError,
};

/// Union of all clipwright error families.
///
/// # Examples
///
/// ```
/// use clipwright_error::{ClipwrightError, CompletionError};
///
/// let completion_err = CompletionError::provider("connection reset");
/// let err: ClipwrightError = completion_err.into();
/// assert!(format!("{}", err).contains("Completion Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ClipwrightErrorKind {
    /// Task validation or aggregate outcome error
    #[from(TaskError)]
    Task(TaskError),
    /// Cooperative cancellation signal
    #[from(TerminatedError)]
    Terminated(TerminatedError),
    /// Structured-output parse failure
    #[from(JsonParseError)]
    JsonParse(JsonParseError),
    /// LLM completion call failure
    #[from(CompletionError)]
    Completion(CompletionError),
    /// Persistence failure
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Configuration failure
    #[from(ConfigError)]
    Config(ConfigError),
    /// Queue operation failure
    #[from(QueueError)]
    Queue(QueueError),
}

/// Clipwright error with kind discrimination.
///
/// # Examples
///
/// ```
/// use clipwright_error::{ClipwrightResult, TaskError};
///
/// fn might_fail() -> ClipwrightResult<()> {
///     Err(TaskError::missing_field("episodeId"))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(!err.is_termination());
/// assert!(err.to_string().contains("episodeId is required"));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Clipwright Error: {}", _0)]
pub struct ClipwrightError(Box<ClipwrightErrorKind>);

impl ClipwrightError {
    /// Create a new error from a kind.
    pub fn new(kind: ClipwrightErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ClipwrightErrorKind {
        &self.0
    }

    /// Whether this error is the cancellation signal.
    ///
    /// Catch boundaries that tolerate per-unit failures must consult this
    /// and re-raise terminations instead of recording them.
    pub fn is_termination(&self) -> bool {
        matches!(*self.0, ClipwrightErrorKind::Terminated(_))
    }

    /// View this error as a parse failure, if it is one.
    pub fn as_json_parse(&self) -> Option<&JsonParseError> {
        match &*self.0 {
            ClipwrightErrorKind::JsonParse(e) => Some(e),
            _ => None,
        }
    }

    /// View this error as a task error, if it is one.
    pub fn as_task(&self) -> Option<&TaskError> {
        match &*self.0 {
            ClipwrightErrorKind::Task(e) => Some(e),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to ClipwrightErrorKind
impl<T> From<T> for ClipwrightError
where
    T: Into<ClipwrightErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for clipwright operations.
///
/// # Examples
///
/// ```
/// use clipwright_error::{ClipwrightResult, QueueError};
///
/// fn claim() -> ClipwrightResult<()> {
///     Err(QueueError::new("queue closed"))?
/// }
/// ```
pub type ClipwrightResult<T> = std::result::Result<T, ClipwrightError>;
