//! Execution of a single LLM-backed step.

use async_trait::async_trait;
use clipwright_core::{CompletionRequest, Message, StepMetadata, StepOutput, TaskJob};
use clipwright_error::{ClipwrightResult, CompletionError};
use clipwright_interface::{
    AuditKind, AuditLog, CompletionDriver, GenerationOptions, ProgressMeta, TaskChannel,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lower bound of the progress band reserved for step execution.
pub const STEP_BAND_START: u8 = 15;
/// Upper bound of the progress band reserved for step execution.
pub const STEP_BAND_END: u8 = 70;

/// Map a step ordinal into the step progress band.
///
/// The exact constants are non-normative; callers may only rely on
/// monotonicity and stage ordering.
pub fn step_percent(step_index: u32, step_total: u32) -> u8 {
    let span = (STEP_BAND_END - STEP_BAND_START) as u32;
    let total = step_total.max(1);
    let index = step_index.min(total);
    STEP_BAND_START + (span * index / total) as u8
}

/// Capability injected into orchestrators: run one step.
///
/// Orchestrators call this in sequence or per-unit; fakes implement it in
/// tests so assembly logic stays independently testable.
#[async_trait]
pub trait RunStep: Send + Sync {
    /// Execute one LLM-backed step and return its raw output.
    async fn run_step(
        &self,
        meta: &StepMetadata,
        prompt: &str,
        action: &str,
        max_output_tokens: u32,
    ) -> ClipwrightResult<StepOutput>;
}

/// Runs steps for one job: liveness gate, full-text audit, banded progress,
/// one completion call. No retry at this layer.
pub struct StepRunner {
    job: TaskJob,
    driver: Arc<dyn CompletionDriver>,
    channel: Arc<dyn TaskChannel>,
    audit: Arc<dyn AuditLog>,
    model_key: String,
    options: GenerationOptions,
    high_water: AtomicU8,
}

impl StepRunner {
    /// Bind a runner to a job, its resolved model, and its collaborators.
    pub fn new(
        job: TaskJob,
        driver: Arc<dyn CompletionDriver>,
        channel: Arc<dyn TaskChannel>,
        audit: Arc<dyn AuditLog>,
        model_key: impl Into<String>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            job,
            driver,
            channel,
            audit,
            model_key: model_key.into(),
            options,
            high_water: AtomicU8::new(0),
        }
    }

    /// The job this runner is bound to.
    pub fn job(&self) -> &TaskJob {
        &self.job
    }

    /// Report progress, clamped so percentages never decrease within this
    /// runner even when a data-driven workflow revises its step total.
    async fn report(&self, percent: u8, meta: &ProgressMeta) {
        let previous = self.high_water.fetch_max(percent, Ordering::AcqRel);
        self.channel
            .report_progress(&self.job, percent.max(previous), meta)
            .await;
    }
}

#[async_trait]
impl RunStep for StepRunner {
    #[tracing::instrument(
        skip(self, prompt),
        fields(
            step_id = %meta.step_id,
            step_index = meta.step_index,
            attempt = meta.step_attempt,
            action = %action,
        )
    )]
    async fn run_step(
        &self,
        meta: &StepMetadata,
        prompt: &str,
        action: &str,
        max_output_tokens: u32,
    ) -> ClipwrightResult<StepOutput> {
        // Liveness gate before the billable call.
        self.channel
            .assert_active(&self.job, &format!("before-step:{}", meta.step_id))
            .await?;

        // Full prompt, untruncated, before the call.
        self.audit
            .record(&self.job, &meta.step_id, AuditKind::Prompt, prompt)
            .await;

        let progress_meta = ProgressMeta::new(meta.step_title.clone(), Some(action.to_string()));
        self.report(step_percent(meta.step_index, meta.step_total), &progress_meta)
            .await;

        let request = CompletionRequest::builder()
            .messages(vec![Message::user(prompt)])
            .model(Some(self.model_key.clone()))
            .max_output_tokens(Some(max_output_tokens))
            .reasoning_effort(self.options.reasoning_effort)
            .build()
            .map_err(|e| CompletionError::provider(format!("failed to build request: {}", e)))?;

        let completion = self
            .driver
            .complete(*self.job.user_id(), &self.model_key, &request)
            .await?;
        let parts = completion.parts();

        // Full raw response, untruncated, after the call.
        self.audit
            .record(&self.job, &meta.step_id, AuditKind::Response, &parts.text)
            .await;

        self.report(
            step_percent(meta.step_index + 1, meta.step_total),
            &progress_meta,
        )
        .await;

        tracing::debug!(
            response_length = parts.text.len(),
            has_reasoning = parts.reasoning.is_some(),
            "step completed"
        );

        Ok(StepOutput {
            text: parts.text,
            reasoning: parts.reasoning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_percent_stays_in_band() {
        assert_eq!(step_percent(0, 10), STEP_BAND_START);
        assert_eq!(step_percent(10, 10), STEP_BAND_END);
        assert!(step_percent(5, 10) > STEP_BAND_START);
        assert!(step_percent(5, 10) < STEP_BAND_END);
    }

    #[test]
    fn step_percent_handles_zero_total() {
        assert_eq!(step_percent(0, 0), STEP_BAND_START);
        assert_eq!(step_percent(3, 0), STEP_BAND_END);
    }
}
