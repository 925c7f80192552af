//! LLM completion call errors.

/// Specific error conditions for completion calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CompletionErrorKind {
    /// The provider rejected or failed the request
    #[display("provider error: {}", _0)]
    Provider(String),
    /// The call did not complete in time
    #[display("completion timed out: {}", _0)]
    Timeout(String),
    /// The provider returned no usable text
    #[display("completion returned no text")]
    EmptyResponse,
}

impl CompletionErrorKind {
    /// Whether a caller-side retry could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Error type for completion driver operations.
///
/// # Examples
///
/// ```
/// use clipwright_error::CompletionError;
///
/// let err = CompletionError::provider("rate limited");
/// assert!(format!("{}", err).contains("rate limited"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Completion Error: {} at line {} in {}", kind, line, file)]
pub struct CompletionError {
    /// The specific error condition
    pub kind: CompletionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CompletionError {
    /// Create a new CompletionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CompletionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a provider-side failure.
    #[track_caller]
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(CompletionErrorKind::Provider(message.into()))
    }
}
