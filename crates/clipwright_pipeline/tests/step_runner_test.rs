//! Tests for the step runner's liveness, audit, and progress contracts.

use async_trait::async_trait;
use clipwright_core::{
    Completion, CompletionRequest, Locale, StepMetadata, TaskJob, TaskType,
};
use clipwright_error::{ClipwrightResult, TerminatedError, TerminatedErrorKind};
use clipwright_interface::{
    AuditKind, AuditLog, CompletionDriver, GenerationOptions, ProgressMeta, TaskChannel,
};
use clipwright_pipeline::{RunStep, STEP_BAND_END, STEP_BAND_START, StepRunner};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

struct CountingDriver {
    calls: AtomicUsize,
    response: String,
}

impl CountingDriver {
    fn new(response: &str) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            response: response.to_string(),
        }
    }
}

#[async_trait]
impl CompletionDriver for CountingDriver {
    async fn complete(
        &self,
        _user_id: i64,
        _model_key: &str,
        _req: &CompletionRequest,
    ) -> ClipwrightResult<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Completion {
            text: self.response.clone(),
            reasoning: Some("thinking trace".to_string()),
            model: None,
        })
    }

    fn provider_name(&self) -> &'static str {
        "counting"
    }
}

struct RecordingChannel {
    cancelled: bool,
    reports: Mutex<Vec<u8>>,
}

impl RecordingChannel {
    fn live() -> Self {
        Self {
            cancelled: false,
            reports: Mutex::new(Vec::new()),
        }
    }

    fn cancelled() -> Self {
        Self {
            cancelled: true,
            reports: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TaskChannel for RecordingChannel {
    async fn report_progress(&self, _job: &TaskJob, percent: u8, _meta: &ProgressMeta) {
        self.reports.lock().await.push(percent);
    }

    async fn assert_active(&self, job: &TaskJob, checkpoint: &str) -> ClipwrightResult<()> {
        if self.cancelled {
            return Err(TerminatedError::new(TerminatedErrorKind::Cancelled {
                task_id: job.task_id().clone(),
                checkpoint: checkpoint.to_string(),
            })
            .into());
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryAudit {
    records: Mutex<Vec<(String, AuditKind, String)>>,
}

#[async_trait]
impl AuditLog for MemoryAudit {
    async fn record(&self, _job: &TaskJob, step_id: &str, kind: AuditKind, body: &str) {
        self.records
            .lock()
            .await
            .push((step_id.to_string(), kind, body.to_string()));
    }
}

fn job() -> TaskJob {
    TaskJob::builder()
        .task_id("task-1")
        .task_type(TaskType::StoryToScript)
        .project_id(1)
        .episode_id(Some(10))
        .user_id(7)
        .locale(Locale::En)
        .build()
        .unwrap()
}

#[tokio::test]
async fn cancelled_job_never_reaches_the_driver() {
    let driver = Arc::new(CountingDriver::new("unused"));
    let channel = Arc::new(RecordingChannel::cancelled());
    let audit = Arc::new(MemoryAudit::default());
    let runner = StepRunner::new(
        job(),
        driver.clone(),
        channel,
        audit,
        "deepseek-chat",
        GenerationOptions::default(),
    );

    let meta = StepMetadata::new("characters", "Character profiles", 0, 4);
    let err = runner
        .run_step(&meta, "prompt", "analyze_characters", 1024)
        .await
        .expect_err("cancelled before the billable call");

    assert!(err.is_termination());
    assert_eq!(driver.calls.load(Ordering::SeqCst), 0, "no billable call");
}

#[tokio::test]
async fn records_full_prompt_and_response() {
    let driver = Arc::new(CountingDriver::new("raw model text"));
    let channel = Arc::new(RecordingChannel::live());
    let audit = Arc::new(MemoryAudit::default());
    let runner = StepRunner::new(
        job(),
        driver,
        channel,
        audit.clone(),
        "deepseek-chat",
        GenerationOptions::default(),
    );

    let long_prompt = "analyze this ".repeat(500);
    let meta = StepMetadata::new("characters", "Character profiles", 0, 4);
    let output = runner
        .run_step(&meta, &long_prompt, "analyze_characters", 1024)
        .await
        .unwrap();

    assert_eq!(output.text, "raw model text");
    assert_eq!(output.reasoning.as_deref(), Some("thinking trace"));

    let records = audit.records.lock().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].1, AuditKind::Prompt);
    assert_eq!(records[0].2, long_prompt, "prompt is never truncated");
    assert_eq!(records[1].1, AuditKind::Response);
    assert_eq!(records[1].2, "raw model text");
}

#[tokio::test]
async fn progress_stays_in_band_and_monotonic_across_revised_totals() {
    let driver = Arc::new(CountingDriver::new("ok"));
    let channel = Arc::new(RecordingChannel::live());
    let audit = Arc::new(MemoryAudit::default());
    let runner = StepRunner::new(
        job(),
        driver,
        channel.clone(),
        audit,
        "deepseek-chat",
        GenerationOptions::default(),
    );

    // Fixed steps run against a provisional total of 4...
    for index in 0..3 {
        let meta = StepMetadata::new(format!("step-{}", index), "Fixed", index, 4);
        runner.run_step(&meta, "p", "fixed", 256).await.unwrap();
    }
    // ...then segmentation reveals a much larger total, which would map the
    // next ordinal to a lower raw percentage.
    let meta = StepMetadata::new("clip-step", "Per clip", 3, 12);
    runner.run_step(&meta, "p", "per_clip", 256).await.unwrap();

    let reports = channel.reports.lock().await;
    assert!(!reports.is_empty());
    for pair in reports.windows(2) {
        assert!(pair[1] >= pair[0], "progress must never decrease: {:?}", reports);
    }
    for percent in reports.iter() {
        assert!(*percent >= STEP_BAND_START && *percent <= STEP_BAND_END);
    }
}
