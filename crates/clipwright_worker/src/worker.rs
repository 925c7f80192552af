//! Fixed-pool worker loop.

use crate::handlers::{handle_script_to_storyboard_task, handle_story_to_script_task};
use crate::queue::{LoggingQueueEvents, QueueEvents};
use crate::{HandlerContext, WorkerSettings};

use clipwright_core::{JobEnvelope, TaskJob, TaskType};
use clipwright_error::{ClipwrightResult, QueueError};
use clipwright_interface::JobQueue;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

struct PoolInner {
    queue: Arc<dyn JobQueue>,
    ctx: HandlerContext,
    events: Arc<dyn QueueEvents>,
    settings: WorkerSettings,
    shutdown: AtomicBool,
}

/// A small fixed pool of long-running workers.
///
/// Each job is claimed by exactly one worker and runs to a terminal
/// outcome; within a job, steps execute sequentially. The pool never
/// splits a job across workers.
#[derive(Clone)]
pub struct WorkerPool {
    inner: Arc<PoolInner>,
}

impl WorkerPool {
    /// Create a pool over a queue and handler context.
    pub fn new(queue: Arc<dyn JobQueue>, ctx: HandlerContext, settings: WorkerSettings) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                queue,
                ctx,
                events: Arc::new(LoggingQueueEvents),
                settings,
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Replace the process-level event hooks.
    pub fn with_events(
        queue: Arc<dyn JobQueue>,
        ctx: HandlerContext,
        settings: WorkerSettings,
        events: Arc<dyn QueueEvents>,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                queue,
                ctx,
                events,
                settings,
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Ask all workers to stop after their current job.
    pub fn request_shutdown(&self) {
        self.inner.shutdown.store(true, Ordering::SeqCst);
    }

    /// Run the pool until shutdown is requested.
    pub async fn run(&self) {
        self.spawn_workers(false).await;
    }

    /// Run the pool until the queue is drained; used by embedders and
    /// tests that enqueue a fixed batch.
    pub async fn run_until_idle(&self) {
        self.spawn_workers(true).await;
    }

    async fn spawn_workers(&self, drain: bool) {
        let mut handles = Vec::new();
        for worker_id in 0..*self.inner.settings.worker_count() {
            let inner = self.inner.clone();
            handles.push(tokio::spawn(async move {
                inner.events.on_ready(worker_id);
                worker_loop(inner, worker_id, drain).await;
            }));
        }
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "worker task panicked");
            }
        }
    }
}

async fn worker_loop(inner: Arc<PoolInner>, worker_id: usize, drain: bool) {
    loop {
        if inner.shutdown.load(Ordering::SeqCst) {
            tracing::info!(worker_id, "worker stopping on shutdown request");
            break;
        }

        match inner.queue.claim().await {
            Ok(Some(envelope)) => process(&inner, envelope).await,
            Ok(None) => {
                if drain {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(*inner.settings.poll_interval_ms()))
                    .await;
            }
            Err(e) => {
                inner.events.on_error(&e);
                tokio::time::sleep(Duration::from_millis(*inner.settings.poll_interval_ms()))
                    .await;
            }
        }
    }
}

async fn process(inner: &PoolInner, envelope: JobEnvelope) {
    let job_id = *envelope.id();
    let job = envelope.data();
    tracing::info!(
        job_id,
        task_id = %job.task_id(),
        task_type = %job.task_type(),
        "job claimed"
    );

    match dispatch(&inner.ctx, job).await {
        Ok(result) => {
            if let Err(e) = inner.queue.complete(job_id, result).await {
                inner.events.on_error(&e);
            }
            inner.events.on_completed(job_id);
        }
        Err(e) => {
            if e.is_termination() {
                tracing::info!(job_id, task_id = %job.task_id(), error = %e, "job terminated");
            } else {
                tracing::error!(
                    job_id,
                    task_id = %job.task_id(),
                    task_type = %job.task_type(),
                    error = %e,
                    "job failed"
                );
            }
            let message = e.to_string();
            if let Err(queue_err) = inner.queue.fail(job_id, &message).await {
                inner.events.on_error(&queue_err);
            }
            inner.events.on_failed(job_id, &message);
        }
    }
}

/// Route a job to its handler and serialize the literal result object.
async fn dispatch(ctx: &HandlerContext, job: &TaskJob) -> ClipwrightResult<serde_json::Value> {
    match job.task_type() {
        TaskType::StoryToScript => {
            let result = handle_story_to_script_task(ctx, job).await?;
            serde_json::to_value(result)
                .map_err(|e| QueueError::new(format!("result not serializable: {}", e)).into())
        }
        TaskType::ScriptToStoryboard => {
            let result = handle_script_to_storyboard_task(ctx, job).await?;
            serde_json::to_value(result)
                .map_err(|e| QueueError::new(format!("result not serializable: {}", e)).into())
        }
    }
}
