//! Task validation and aggregate outcome errors.

/// One failed sub-unit of a batch, kept for partial-failure previews.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FailedUnit {
    /// Identifier of the failing unit (e.g. a clip id)
    pub unit_id: String,
    /// Reason the unit failed
    pub reason: String,
}

impl std::fmt::Display for FailedUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.unit_id, self.reason)
    }
}

fn preview_text(preview: &[FailedUnit]) -> String {
    preview
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Specific error conditions raised by task handlers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum TaskErrorKind {
    /// A required job field is absent
    #[display("{} is required", _0)]
    MissingField(String),
    /// A job field is present but has the wrong shape
    #[display("field '{}' is invalid: {}", field, message)]
    InvalidField {
        /// Field name
        field: String,
        /// What was wrong with it
        message: String,
    },
    /// The owning project's mode does not support the requested workflow
    #[display("project {} mode '{}' does not support task type '{}'", project_id, mode, task_type)]
    ModeMismatch {
        /// Project id
        project_id: i64,
        /// The project's actual mode
        mode: String,
        /// The requested task type
        task_type: String,
    },
    /// No analysis model could be resolved for the job
    #[display("analysisModel is not configured")]
    ModelNotConfigured,
    /// The target entity was deleted while the job was running
    #[display("NOT_FOUND: {} {} no longer exists", entity, id)]
    NotFound {
        /// Entity kind (e.g. "episode")
        entity: String,
        /// Entity id
        id: i64,
    },
    /// Some sub-units of a required-unanimous batch failed
    #[display("{}: {} of {} units failed ({})", token, failed, total, preview_text(preview))]
    PartialFailure {
        /// Stable machine-readable token, e.g. `STORY_TO_SCRIPT_PARTIAL_FAILED`
        token: String,
        /// Number of failed units
        failed: usize,
        /// Total number of units
        total: usize,
        /// Up to the first three failing units
        preview: Vec<FailedUnit>,
    },
}

/// Error type for task handler operations.
///
/// # Examples
///
/// ```
/// use clipwright_error::{TaskError, TaskErrorKind};
///
/// let err = TaskError::new(TaskErrorKind::MissingField("episodeId".to_string()));
/// assert!(format!("{}", err).contains("episodeId is required"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Task Error: {} at line {} in {}", kind, line, file)]
pub struct TaskError {
    /// The specific error condition
    pub kind: TaskErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl TaskError {
    /// Create a new TaskError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: TaskErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for a missing-field validation failure.
    #[track_caller]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(TaskErrorKind::MissingField(field.into()))
    }

    /// Build a partial-failure error, truncating the preview to three units.
    #[track_caller]
    pub fn partial_failure(
        token: impl Into<String>,
        failed: usize,
        total: usize,
        units: Vec<FailedUnit>,
    ) -> Self {
        let preview = units.into_iter().take(3).collect();
        Self::new(TaskErrorKind::PartialFailure {
            token: token.into(),
            failed,
            total,
            preview,
        })
    }
}
