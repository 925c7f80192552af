//! Structured-output parse failures.

/// A model response failed to parse against the expected JSON shape.
///
/// Carries the full raw text so a postmortem can inspect exactly what the
/// model produced. `Display` shows only the parse message and a short
/// preview; use [`JsonParseError::raw_text`] for the complete payload.
///
/// # Examples
///
/// ```
/// use clipwright_error::JsonParseError;
///
/// let err = JsonParseError::new("clip segmentation", "expected an array", "oops, not json");
/// assert!(format!("{}", err).contains("clip segmentation"));
/// assert_eq!(err.raw_text, "oops, not json");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON parse failure in {}: {} (raw preview: {}) at line {} in {}", context, message, preview(raw_text), line, file)]
pub struct JsonParseError {
    /// What was being parsed (step or field label)
    pub context: String,
    /// The underlying parse error message
    pub message: String,
    /// Full raw model output that failed to parse
    pub raw_text: String,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

fn preview(raw: &str) -> String {
    let mut p: String = raw.chars().take(120).collect();
    if raw.chars().count() > 120 {
        p.push_str("...");
    }
    p
}

impl JsonParseError {
    /// Create a new JsonParseError with automatic location tracking.
    #[track_caller]
    pub fn new(
        context: impl Into<String>,
        message: impl Into<String>,
        raw_text: impl Into<String>,
    ) -> Self {
        let location = std::panic::Location::caller();
        Self {
            context: context.into(),
            message: message.into(),
            raw_text: raw_text.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
