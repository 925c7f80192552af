//! Handler for script→storyboard generation jobs.

use super::{load_checked_project, report_phase, require_episode_id, require_live_episode};
use crate::resolve::resolve_analysis_model;
use crate::{HandlerContext, TaskPhase};

use clipwright_core::{PayloadView, TaskJob};
use clipwright_error::{ClipwrightResult, TaskError};
use clipwright_interface::workflow::ScriptToStoryboardResult;
use clipwright_interface::{GenerationOptionsQuery, ModelType};
use clipwright_pipeline::{
    ScriptToStoryboardInput, StepRunner, run_script_to_storyboard, run_voice_analysis,
    voice_step_metadata,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};

/// Voice analysis runs at most this many times per job.
const VOICE_ANALYSIS_ATTEMPTS: u32 = 2;

/// Literal counts returned to the queue on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptToStoryboardTaskResult {
    /// Storyboards written
    pub storyboard_count: usize,
    /// Panels written
    pub panel_count: usize,
    /// Voice lines written
    pub voice_line_count: usize,
}

/// Run one script→storyboard job to a terminal outcome.
///
/// Storyboard construction is fail-fast; the voice-analysis step is the
/// one step retried (once) on non-termination errors, since its output is
/// independent of the construction steps already banked.
#[tracing::instrument(skip(ctx, job), fields(task_id = %job.task_id(), project_id = job.project_id()))]
pub async fn handle_script_to_storyboard_task(
    ctx: &HandlerContext,
    job: &TaskJob,
) -> ClipwrightResult<ScriptToStoryboardTaskResult> {
    report_phase(ctx, job, TaskPhase::Received).await;

    let episode_id = require_episode_id(job)?;
    let project = load_checked_project(ctx, job).await?;

    let episode = ctx.episodes.episode(episode_id).await?.ok_or_else(|| {
        TaskError::new(clipwright_error::TaskErrorKind::NotFound {
            entity: "episode".to_string(),
            id: episode_id,
        })
    })?;

    let payload = PayloadView::new(job.payload());
    let script_text = match payload.opt_str_field("scriptText")? {
        Some(text) => text.to_string(),
        None => episode
            .script_text()
            .clone()
            .ok_or_else(|| TaskError::missing_field("scriptText"))?,
    };

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

    let runner = StepRunner::new(
        job.clone(),
        ctx.driver.clone(),
        ctx.channel.clone(),
        ctx.audit.clone(),
        model_key,
        options,
    );
    let locale = *job.locale();
    let input = ScriptToStoryboardInput {
        episode_id,
        script_text: script_text.clone(),
        locale,
    };

    report_phase(ctx, job, TaskPhase::StepRunning).await;
    let storyboards = run_script_to_storyboard(&runner, ctx.prompts.as_ref(), &input).await?;

    // Voice analysis with bounded retry. The cancellation signal is
    // permanent by definition; anything else gets one more attempt.
    let base_meta = voice_step_metadata(&storyboards);
    let attempts = AtomicU32::new(0);
    let strategy = ExponentialBackoff::from_millis(200)
        .map(jitter)
        .take((VOICE_ANALYSIS_ATTEMPTS - 1) as usize);
    let prompts = ctx.prompts.as_ref();
    let voice_lines = Retry::spawn(strategy, || {
        let attempt_no = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let meta = base_meta.with_attempt(attempt_no);
        let runner = &runner;
        let storyboards = &storyboards;
        let script_text = script_text.as_str();
        async move {
            match run_voice_analysis(runner, prompts, locale, script_text, storyboards, &meta)
                .await
            {
                Ok(lines) => Ok(lines),
                Err(e) if e.is_termination() => Err(RetryError::Permanent(e)),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt_no,
                        error = %e,
                        "voice analysis failed, will retry if attempts remain"
                    );
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
            }
        }
    })
    .await?;

    let result = ScriptToStoryboardResult::new(storyboards, voice_lines);

    ctx.channel.assert_active(job, "before-persist").await?;
    require_live_episode(ctx, episode_id).await?;

    report_phase(ctx, job, TaskPhase::Persisting).await;
    let report = ctx
        .storyboards
        .replace_storyboard_generation(episode_id, &result)
        .await?;
    report_phase(ctx, job, TaskPhase::Done).await;

    Ok(ScriptToStoryboardTaskResult {
        storyboard_count: report.storyboard_count,
        panel_count: report.panel_count,
        voice_line_count: report.voice_line_count,
    })
}
