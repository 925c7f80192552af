//! Queued task job types.

use crate::Locale;
use serde::{Deserialize, Serialize};

/// The generation workflows the worker can run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskType {
    /// Novel text to per-clip screenplay
    StoryToScript,
    /// Screenplay to storyboards, panels, and voice lines
    ScriptToStoryboard,
}

impl TaskType {
    /// Stable string code used for dispatch and dedupe keys.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StoryToScript => "story_to_script",
            Self::ScriptToStoryboard => "script_to_storyboard",
        }
    }

    /// Machine-readable token used in partial-failure messages.
    pub fn partial_failure_token(&self) -> &'static str {
        match self {
            Self::StoryToScript => "STORY_TO_SCRIPT_PARTIAL_FAILED",
            Self::ScriptToStoryboard => "SCRIPT_TO_STORYBOARD_PARTIAL_FAILED",
        }
    }

    /// Whether a project in the given mode may run this workflow.
    pub fn supports_mode(&self, mode: ProjectMode) -> bool {
        match self {
            Self::StoryToScript => mode == ProjectMode::NovelPromotion,
            Self::ScriptToStoryboard => {
                matches!(mode, ProjectMode::NovelPromotion | ProjectMode::ScriptImport)
            }
        }
    }
}

/// Authoring mode of a project.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProjectMode {
    /// Project starts from novel text and derives everything downstream
    NovelPromotion,
    /// Project starts from an imported screenplay
    ScriptImport,
}

/// One unit of queued work, immutable once created.
///
/// # Examples
///
/// ```
/// use clipwright_core::{Locale, TaskJob, TaskType};
///
/// let job = TaskJob::builder()
///     .task_id("task-1")
///     .task_type(TaskType::StoryToScript)
///     .project_id(1)
///     .episode_id(Some(10))
///     .user_id(7)
///     .build()
///     .unwrap();
///
/// assert_eq!(job.dedupe_key(), "story_to_script:10");
/// assert_eq!(*job.locale(), Locale::En);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct TaskJob {
    /// Unique task identifier assigned at enqueue time
    task_id: String,
    /// Which workflow to run
    task_type: TaskType,
    /// Owning project
    project_id: i64,
    /// Target episode, when the workflow operates on one
    #[builder(default)]
    episode_id: Option<i64>,
    /// Optional secondary target kind
    #[builder(default)]
    target_type: Option<String>,
    /// Optional secondary target id
    #[builder(default)]
    target_id: Option<i64>,
    /// Arbitrary JSON payload, read through [`crate::PayloadView`]
    #[builder(default = "serde_json::Value::Null")]
    payload: serde_json::Value,
    /// Requesting user
    user_id: i64,
    /// Locale for prompt templates
    #[builder(default)]
    locale: Locale,
}

impl TaskJob {
    /// Start building a job.
    pub fn builder() -> TaskJobBuilder {
        TaskJobBuilder::default()
    }

    /// Identity used to supersede stale jobs for the same target.
    ///
    /// Falls back to the secondary target, then the task id, when no
    /// episode is set.
    pub fn dedupe_key(&self) -> String {
        match (self.episode_id, self.target_id) {
            (Some(episode_id), _) => format!("{}:{}", self.task_type.code(), episode_id),
            (None, Some(target_id)) => format!("{}:{}", self.task_type.code(), target_id),
            (None, None) => format!("{}:{}", self.task_type.code(), self.task_id),
        }
    }
}

/// A claimed job: queue-assigned id plus the immutable job data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct JobEnvelope {
    /// Queue-assigned id
    id: i64,
    /// The job data
    data: TaskJob,
}

impl JobEnvelope {
    /// Wrap a job with its queue id.
    pub fn new(id: i64, data: TaskJob) -> Self {
        Self { id, data }
    }
}
