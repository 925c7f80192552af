//! Trait definitions for the collaborators the core consumes.

use crate::workflow::{ScriptToStoryboardResult, StoryToScriptResult};
use crate::{
    AuditKind, EpisodeRecord, GenerationOptions, GenerationOptionsQuery, ProgressMeta,
    ProjectModelConfig, ProjectRecord, ScriptPersistReport, StoryboardPersistReport,
};
use async_trait::async_trait;
use clipwright_core::{CompletionRequest, Completion, JobEnvelope, Locale, TaskJob};
use clipwright_error::ClipwrightResult;
use std::collections::HashMap;

/// The LLM completion client.
///
/// One call per step; the wire protocol behind it is out of scope for the
/// orchestration core.
#[async_trait]
pub trait CompletionDriver: Send + Sync {
    /// Run one completion call on behalf of a user.
    async fn complete(
        &self,
        user_id: i64,
        model_key: &str,
        req: &CompletionRequest,
    ) -> ClipwrightResult<Completion>;

    /// Provider name (e.g. "deepseek", "gemini").
    fn provider_name(&self) -> &'static str;
}

/// Progress reporting and liveness polling for a running job.
///
/// Backed by the task-queue collaborator; the core depends only on this
/// contract.
#[async_trait]
pub trait TaskChannel: Send + Sync {
    /// Report percent-complete plus stage metadata.
    ///
    /// Best-effort: implementations must swallow and log their own
    /// failures; a lost progress report never aborts a task.
    async fn report_progress(&self, job: &TaskJob, percent: u8, meta: &ProgressMeta);

    /// Verify the job is still live.
    ///
    /// Returns a `TerminatedError` when the job has been cancelled or
    /// superseded by a newer request for the same dedupe key. Called before
    /// every step and before persistence.
    async fn assert_active(&self, job: &TaskJob, checkpoint: &str) -> ClipwrightResult<()>;
}

/// Full-text audit trail of prompts and raw responses.
///
/// Records are untruncated; they are the primary postmortem artifact for
/// malformed generations.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Record one side of a step.
    async fn record(&self, job: &TaskJob, step_id: &str, kind: AuditKind, body: &str);
}

/// Locale-aware prompt template source.
pub trait PromptLibrary: Send + Sync {
    /// Fetch the raw template for a prompt id.
    fn template(&self, prompt_id: &str, locale: Locale) -> ClipwrightResult<String>;

    /// Build a prompt by substituting `{{variable}}` placeholders.
    ///
    /// An unresolved placeholder is an error, not silently left in place.
    fn build(
        &self,
        prompt_id: &str,
        locale: Locale,
        vars: &HashMap<String, String>,
    ) -> ClipwrightResult<String>;
}

/// Model configuration resolution.
#[async_trait]
pub trait ModelConfigSource: Send + Sync {
    /// Resolve the project's model configuration for a user, including the
    /// user-preference fallback.
    async fn project_model_config(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> ClipwrightResult<ProjectModelConfig>;

    /// Resolve capability-specific generation options for a model key.
    async fn generation_options(
        &self,
        query: &GenerationOptionsQuery,
    ) -> ClipwrightResult<GenerationOptions>;
}

/// Read access to projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Load a project by id, if it exists.
    async fn project(&self, project_id: i64) -> ClipwrightResult<Option<ProjectRecord>>;
}

/// Read access to episodes.
#[async_trait]
pub trait EpisodeStore: Send + Sync {
    /// Load an episode by id, if it exists.
    ///
    /// Handlers call this twice: once to load inputs and once immediately
    /// before persistence, because a long job can outlive its target.
    async fn episode(&self, episode_id: i64) -> ClipwrightResult<Option<EpisodeRecord>>;
}

/// Transactional persistence for story→script output.
#[async_trait]
pub trait ScriptGenerationStore: Send + Sync {
    /// Replace the episode's derived script rows with this run's output.
    ///
    /// Full-replace, not an incremental diff: existing clips for the
    /// episode are deleted and the new set inserted in one transaction.
    async fn replace_script_generation(
        &self,
        episode_id: i64,
        result: &StoryToScriptResult,
    ) -> ClipwrightResult<ScriptPersistReport>;
}

/// Transactional persistence for script→storyboard output.
#[async_trait]
pub trait StoryboardGenerationStore: Send + Sync {
    /// Replace the episode's storyboards, panels, and voice lines with this
    /// run's output.
    ///
    /// Full-replace in one transaction. Voice-line panel references must
    /// resolve against the panels created by this same call; an orphaned
    /// reference aborts the whole transaction.
    async fn replace_storyboard_generation(
        &self,
        episode_id: i64,
        result: &ScriptToStoryboardResult,
    ) -> ClipwrightResult<StoryboardPersistReport>;
}

/// The job queue the worker pool consumes.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Claim the next job, if any. Each job is claimed by exactly one
    /// worker and runs to a terminal outcome.
    async fn claim(&self) -> ClipwrightResult<Option<JobEnvelope>>;

    /// Mark a job completed with its literal result object.
    async fn complete(&self, job_id: i64, result: serde_json::Value) -> ClipwrightResult<()>;

    /// Mark a job failed.
    async fn fail(&self, job_id: i64, error: &str) -> ClipwrightResult<()>;
}
