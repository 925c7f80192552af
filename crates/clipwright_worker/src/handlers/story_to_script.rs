//! Handler for story→script generation jobs.

use super::{load_checked_project, report_phase, require_episode_id, require_live_episode};
use crate::resolve::resolve_analysis_model;
use crate::{HandlerContext, TaskPhase};

use clipwright_core::{PayloadView, TaskJob};
use clipwright_error::{ClipwrightResult, FailedUnit, TaskError};
use clipwright_interface::{GenerationOptionsQuery, ModelType};
use clipwright_pipeline::{StepRunner, StoryToScriptInput, run_story_to_script};
use serde::{Deserialize, Serialize};

/// Literal counts returned to the queue on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryToScriptTaskResult {
    /// Clips produced by segmentation
    pub clip_count: usize,
    /// Clips whose screenplay conversion succeeded
    pub screenplay_success_count: usize,
    /// Clips whose screenplay conversion failed
    pub screenplay_failed_count: usize,
    /// Characters upserted
    pub character_count: usize,
    /// Locations upserted
    pub location_count: usize,
}

/// Run one story→script job to a terminal outcome.
///
/// `received → prepared → step-running → persisting → done`, with failure
/// reachable from every state. This workflow is required-unanimous: any
/// failed clip raises a partial-failure error carrying a preview of the
/// first failures instead of persisting a partial script.
#[tracing::instrument(skip(ctx, job), fields(task_id = %job.task_id(), project_id = job.project_id()))]
pub async fn handle_story_to_script_task(
    ctx: &HandlerContext,
    job: &TaskJob,
) -> ClipwrightResult<StoryToScriptTaskResult> {
    report_phase(ctx, job, TaskPhase::Received).await;

    let episode_id = require_episode_id(job)?;
    let project = load_checked_project(ctx, job).await?;

    let episode = ctx.episodes.episode(episode_id).await?.ok_or_else(|| {
        TaskError::new(clipwright_error::TaskErrorKind::NotFound {
            entity: "episode".to_string(),
            id: episode_id,
        })
    })?;
    let novel_text = episode
        .novel_text()
        .clone()
        .ok_or_else(|| TaskError::missing_field("novelText"))?;

    let model_key = resolve_analysis_model(job, &project, ctx.models.as_ref()).await?;
    let options = ctx
        .models
        .generation_options(&GenerationOptionsQuery::new(
            *job.project_id(),
            *job.user_id(),
            ModelType::Analysis,
            model_key.clone(),
        ))
        .await?;

    report_phase(ctx, job, TaskPhase::Prepared).await;

    let payload = PayloadView::new(job.payload());
    let input = StoryToScriptInput {
        episode_id,
        novel_text,
        locale: *job.locale(),
        max_clip_count: payload.opt_u32_field("maxClipCount")?,
    };

    let runner = StepRunner::new(
        job.clone(),
        ctx.driver.clone(),
        ctx.channel.clone(),
        ctx.audit.clone(),
        model_key,
        options,
    );

    report_phase(ctx, job, TaskPhase::StepRunning).await;
    let result = run_story_to_script(&runner, ctx.prompts.as_ref(), &input).await?;

    if result.summary.screenplay_failed_count > 0 {
        let units: Vec<FailedUnit> = result
            .failed_screenplays()
            .iter()
            .map(|outcome| FailedUnit {
                unit_id: outcome.clip_id.clone(),
                reason: outcome
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown failure".to_string()),
            })
            .collect();
        return Err(TaskError::partial_failure(
            job.task_type().partial_failure_token(),
            result.summary.screenplay_failed_count,
            result.summary.clip_count,
            units,
        )
        .into());
    }

    // Persistence is irreversible: gate on liveness and on the target
    // still existing.
    ctx.channel.assert_active(job, "before-persist").await?;
    require_live_episode(ctx, episode_id).await?;

    report_phase(ctx, job, TaskPhase::Persisting).await;
    let report = ctx.scripts.replace_script_generation(episode_id, &result).await?;
    report_phase(ctx, job, TaskPhase::Done).await;

    Ok(StoryToScriptTaskResult {
        clip_count: result.summary.clip_count,
        screenplay_success_count: result.summary.screenplay_success_count,
        screenplay_failed_count: result.summary.screenplay_failed_count,
        character_count: report.character_count,
        location_count: report.location_count,
    })
}
