//! Analysis model resolution.

use clipwright_core::{PayloadView, TaskJob};
use clipwright_error::{ClipwrightResult, TaskError, TaskErrorKind};
use clipwright_interface::{ModelConfigSource, ProjectRecord};

/// Resolve the analysis model for a job.
///
/// Chain: explicit request override in the payload → project-level
/// configuration → the config source's user-preference fallback. When none
/// resolves, fails with the distinct `analysisModel is not configured`
/// error rather than falling back to an undocumented default — silently
/// picking a model changes both cost and output quality.
#[tracing::instrument(skip_all, fields(task_id = %job.task_id(), project_id = job.project_id()))]
pub async fn resolve_analysis_model(
    job: &TaskJob,
    project: &ProjectRecord,
    models: &dyn ModelConfigSource,
) -> ClipwrightResult<String> {
    let payload = PayloadView::new(job.payload());
    if let Some(model) = payload.opt_str_field("analysisModel")? {
        tracing::debug!(model, "using request override for analysis model");
        return Ok(model.to_string());
    }

    if let Some(model) = project.analysis_model().as_deref() {
        tracing::debug!(model, "using project-level analysis model");
        return Ok(model.to_string());
    }

    let config = models
        .project_model_config(*job.project_id(), *job.user_id())
        .await?;
    match config.analysis_model {
        Some(model) => {
            tracing::debug!(model = %model, "using resolved fallback analysis model");
            Ok(model)
        }
        None => Err(TaskError::new(TaskErrorKind::ModelNotConfigured).into()),
    }
}
