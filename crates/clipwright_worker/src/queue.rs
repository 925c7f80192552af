//! In-process job queue with cancellation and dedupe-key supersession.

use async_trait::async_trait;
use clipwright_core::{JobEnvelope, TaskJob};
use clipwright_error::{
    ClipwrightResult, QueueError, TerminatedError, TerminatedErrorKind,
};
use clipwright_interface::{JobQueue, ProgressMeta, TaskChannel};
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;

/// Terminal and in-flight job states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum JobStatus {
    /// Enqueued, not yet claimed
    Pending,
    /// Claimed by a worker
    Running,
    /// Finished with a result
    Completed,
    /// Finished with an error (including termination)
    Failed,
}

#[derive(Default)]
struct QueueInner {
    pending: VecDeque<JobEnvelope>,
    statuses: HashMap<i64, JobStatus>,
    results: HashMap<i64, serde_json::Value>,
    errors: HashMap<i64, String>,
    progress: HashMap<i64, Vec<u8>>,
    stages: HashMap<i64, String>,
    cancelled: HashSet<i64>,
    superseded: HashMap<i64, String>,
    latest_by_key: HashMap<String, i64>,
    ids_by_task: HashMap<String, i64>,
    next_id: i64,
}

/// Memory-backed queue implementing both the claim contract and the
/// progress/liveness channel.
///
/// Enqueueing a newer job for the same dedupe key marks any live older job
/// superseded; the stale worker observes this at its next liveness
/// checkpoint rather than being preempted.
#[derive(Default)]
pub struct InMemoryJobQueue {
    inner: Mutex<QueueInner>,
}

impl InMemoryJobQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a job, superseding any live job with the same dedupe key.
    pub async fn enqueue(&self, job: TaskJob) -> i64 {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let id = inner.next_id;

        let key = job.dedupe_key();
        if let Some(old_id) = inner.latest_by_key.insert(key, id)
            && !matches!(
                inner.statuses.get(&old_id),
                Some(JobStatus::Completed) | Some(JobStatus::Failed)
            )
        {
            inner.superseded.insert(old_id, job.task_id().clone());
            tracing::debug!(old_job = old_id, new_job = id, "job superseded by newer request");
        }

        inner.ids_by_task.insert(job.task_id().clone(), id);
        inner.statuses.insert(id, JobStatus::Pending);
        inner.pending.push_back(JobEnvelope::new(id, job));
        id
    }

    /// Cancel a job by queue id.
    pub async fn cancel(&self, job_id: i64) {
        self.inner.lock().await.cancelled.insert(job_id);
    }

    /// Current status of a job.
    pub async fn status(&self, job_id: i64) -> Option<JobStatus> {
        self.inner.lock().await.statuses.get(&job_id).copied()
    }

    /// Completion result of a job, if it completed.
    pub async fn result(&self, job_id: i64) -> Option<serde_json::Value> {
        self.inner.lock().await.results.get(&job_id).cloned()
    }

    /// Failure message of a job, if it failed.
    pub async fn error(&self, job_id: i64) -> Option<String> {
        self.inner.lock().await.errors.get(&job_id).cloned()
    }

    /// Every percent value reported for a job, in order.
    pub async fn progress_history(&self, job_id: i64) -> Vec<u8> {
        self.inner
            .lock()
            .await
            .progress
            .get(&job_id)
            .cloned()
            .unwrap_or_default()
    }

    /// The most recent stage label reported for a job.
    pub async fn last_stage(&self, job_id: i64) -> Option<String> {
        self.inner.lock().await.stages.get(&job_id).cloned()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn claim(&self) -> ClipwrightResult<Option<JobEnvelope>> {
        let mut inner = self.inner.lock().await;
        let Some(envelope) = inner.pending.pop_front() else {
            return Ok(None);
        };
        inner.statuses.insert(*envelope.id(), JobStatus::Running);
        Ok(Some(envelope))
    }

    async fn complete(&self, job_id: i64, result: serde_json::Value) -> ClipwrightResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.statuses.contains_key(&job_id) {
            return Err(QueueError::new(format!("unknown job id {}", job_id)).into());
        }
        inner.statuses.insert(job_id, JobStatus::Completed);
        inner.results.insert(job_id, result);
        Ok(())
    }

    async fn fail(&self, job_id: i64, error: &str) -> ClipwrightResult<()> {
        let mut inner = self.inner.lock().await;
        if !inner.statuses.contains_key(&job_id) {
            return Err(QueueError::new(format!("unknown job id {}", job_id)).into());
        }
        inner.statuses.insert(job_id, JobStatus::Failed);
        inner.errors.insert(job_id, error.to_string());
        Ok(())
    }
}

#[async_trait]
impl TaskChannel for InMemoryJobQueue {
    async fn report_progress(&self, job: &TaskJob, percent: u8, meta: &ProgressMeta) {
        let mut inner = self.inner.lock().await;
        let Some(&job_id) = inner.ids_by_task.get(job.task_id()) else {
            // Best-effort contract: an unknown job is logged, never an error.
            tracing::debug!(task_id = %job.task_id(), "progress report for unknown job");
            return;
        };
        inner.progress.entry(job_id).or_default().push(percent.min(100));
        inner.stages.insert(job_id, meta.stage.clone());
        tracing::trace!(job_id, percent, stage = %meta.stage, "progress");
    }

    async fn assert_active(&self, job: &TaskJob, checkpoint: &str) -> ClipwrightResult<()> {
        let inner = self.inner.lock().await;
        let Some(&job_id) = inner.ids_by_task.get(job.task_id()) else {
            return Err(QueueError::new(format!("unknown task '{}'", job.task_id())).into());
        };

        if inner.cancelled.contains(&job_id) {
            return Err(TerminatedError::new(TerminatedErrorKind::Cancelled {
                task_id: job.task_id().clone(),
                checkpoint: checkpoint.to_string(),
            })
            .into());
        }
        if let Some(newer) = inner.superseded.get(&job_id) {
            return Err(TerminatedError::new(TerminatedErrorKind::Superseded {
                task_id: job.task_id().clone(),
                superseded_by: newer.clone(),
                checkpoint: checkpoint.to_string(),
            })
            .into());
        }
        Ok(())
    }
}

/// Process-level observability hooks for the worker pool.
pub trait QueueEvents: Send + Sync {
    /// A worker finished starting up.
    fn on_ready(&self, _worker_id: usize) {}
    /// A queue operation itself failed.
    fn on_error(&self, _error: &clipwright_error::ClipwrightError) {}
    /// A job reached the failed terminal state.
    fn on_failed(&self, _job_id: i64, _error: &str) {}
    /// A job reached the completed terminal state.
    fn on_completed(&self, _job_id: i64) {}
}

/// Default hooks that log through tracing.
#[derive(Debug, Clone, Default)]
pub struct LoggingQueueEvents;

impl QueueEvents for LoggingQueueEvents {
    fn on_ready(&self, worker_id: usize) {
        tracing::info!(worker_id, "worker ready");
    }

    fn on_error(&self, error: &clipwright_error::ClipwrightError) {
        tracing::error!(error = %error, "queue operation failed");
    }

    fn on_failed(&self, job_id: i64, error: &str) {
        tracing::warn!(job_id, error, "job failed");
    }

    fn on_completed(&self, job_id: i64) {
        tracing::info!(job_id, "job completed");
    }
}
