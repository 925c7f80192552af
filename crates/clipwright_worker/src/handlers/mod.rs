//! Per-task-type handlers.
//!
//! Handlers are the only code allowed to touch persistence stores and
//! queue primitives. Each runs one job to a terminal outcome and returns a
//! plain result object with literal counts for downstream display.

mod script_to_storyboard;
mod story_to_script;

pub use script_to_storyboard::{
    ScriptToStoryboardTaskResult, handle_script_to_storyboard_task,
};
pub use story_to_script::{StoryToScriptTaskResult, handle_story_to_script_task};

use crate::{HandlerContext, TaskPhase};
use clipwright_core::{ProjectMode, TaskJob};
use clipwright_error::{ClipwrightResult, TaskError, TaskErrorKind};
use clipwright_interface::{ProgressMeta, ProjectRecord};

/// Report a phase transition; best-effort like all progress reporting.
pub(crate) async fn report_phase(ctx: &HandlerContext, job: &TaskJob, phase: TaskPhase) {
    ctx.channel
        .report_progress(job, phase.percent(), &ProgressMeta::stage_only(phase.to_string()))
        .await;
}

/// Require the episode id every generation workflow operates on.
pub(crate) fn require_episode_id(job: &TaskJob) -> ClipwrightResult<i64> {
    match job.episode_id() {
        Some(episode_id) => Ok(*episode_id),
        None => Err(TaskError::missing_field("episodeId").into()),
    }
}

/// Load the owning project and verify its mode supports the workflow.
///
/// The mode check prevents cross-mode data corruption: a script-import
/// project has no novel text for story→script to consume.
pub(crate) async fn load_checked_project(
    ctx: &HandlerContext,
    job: &TaskJob,
) -> ClipwrightResult<ProjectRecord> {
    let project = ctx
        .projects
        .project(*job.project_id())
        .await?
        .ok_or_else(|| {
            TaskError::new(TaskErrorKind::NotFound {
                entity: "project".to_string(),
                id: *job.project_id(),
            })
        })?;

    let mode: ProjectMode = *project.mode();
    if !job.task_type().supports_mode(mode) {
        return Err(TaskError::new(TaskErrorKind::ModeMismatch {
            project_id: *project.id(),
            mode: mode.to_string(),
            task_type: job.task_type().code().to_string(),
        })
        .into());
    }
    Ok(project)
}

/// Re-verify the episode still exists immediately before persistence.
///
/// A long-running job can outlive the deletion of its target; writing into
/// a vanished parent must fail with a NOT_FOUND error, not an opaque
/// foreign-key violation.
pub(crate) async fn require_live_episode(
    ctx: &HandlerContext,
    episode_id: i64,
) -> ClipwrightResult<()> {
    if ctx.episodes.episode(episode_id).await?.is_none() {
        return Err(TaskError::new(TaskErrorKind::NotFound {
            entity: "episode".to_string(),
            id: episode_id,
        })
        .into());
    }
    Ok(())
}
