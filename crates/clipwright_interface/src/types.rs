//! Shared types for the collaborator contracts.

use clipwright_core::{ProjectMode, ReasoningEffort};
use serde::{Deserialize, Serialize};

/// Stage metadata attached to a progress report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ProgressMeta {
    /// Short stage label (e.g. a step title or phase name)
    pub stage: String,
    /// Optional free-form detail
    pub detail: Option<String>,
}

impl ProgressMeta {
    /// Metadata with a stage label only.
    pub fn stage_only(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            detail: None,
        }
    }
}

/// Which side of a step an audit record captures.
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
)]
pub enum AuditKind {
    /// The full prompt sent to the model
    Prompt,
    /// The full raw response text
    Response,
}

/// Model capability families that can carry per-project overrides.
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
)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Text analysis and generation steps
    Analysis,
    /// Storyboard image generation (not driven by this core)
    Image,
    /// Voice synthesis (not driven by this core)
    Voice,
}

/// Project-level model configuration resolved for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectModelConfig {
    /// The analysis model to use, if one is configured anywhere in the
    /// project-then-user-preference chain
    pub analysis_model: Option<String>,
}

/// Lookup key for capability-specific generation options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct GenerationOptionsQuery {
    /// Owning project
    pub project_id: i64,
    /// Requesting user
    pub user_id: i64,
    /// Capability family being resolved
    pub model_type: ModelType,
    /// The concrete model key the job will use
    pub model_key: String,
}

/// Options resolved for a specific model capability selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GenerationOptions {
    /// Reasoning effort override, when the model supports one
    pub reasoning_effort: Option<ReasoningEffort>,
}

/// Narrow read contract for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct ProjectRecord {
    /// Project id
    id: i64,
    /// Display name
    name: String,
    /// Authoring mode; workflows verify it before running
    mode: ProjectMode,
    /// Project-level analysis model override
    analysis_model: Option<String>,
}

impl ProjectRecord {
    /// Assemble a project record.
    pub fn new(
        id: i64,
        name: impl Into<String>,
        mode: ProjectMode,
        analysis_model: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            mode,
            analysis_model,
        }
    }
}

/// Narrow read contract for an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct EpisodeRecord {
    /// Episode id
    id: i64,
    /// Owning project
    project_id: i64,
    /// Display title
    title: String,
    /// Source novel text, present for novel-promotion projects
    novel_text: Option<String>,
    /// Assembled screenplay text, present once story→script has run
    script_text: Option<String>,
}

impl EpisodeRecord {
    /// Assemble an episode record.
    pub fn new(
        id: i64,
        project_id: i64,
        title: impl Into<String>,
        novel_text: Option<String>,
        script_text: Option<String>,
    ) -> Self {
        Self {
            id,
            project_id,
            title: title.into(),
            novel_text,
            script_text,
        }
    }
}

/// Row counts from a story→script persistence transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct ScriptPersistReport {
    /// Characters upserted
    pub character_count: usize,
    /// Locations upserted
    pub location_count: usize,
    /// Clips written (full replace)
    pub clip_count: usize,
}

/// Row counts from a script→storyboard persistence transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct StoryboardPersistReport {
    /// Storyboards written (full replace)
    pub storyboard_count: usize,
    /// Panels written
    pub panel_count: usize,
    /// Voice lines written (full replace)
    pub voice_line_count: usize,
}
