//! Worker pool tests: claim-to-terminal processing and dedupe-key
//! supersession.

mod support;

use clipwright_core::ProjectMode;
use clipwright_interface::JobQueue;
use clipwright_worker::{
    InMemoryJobQueue, JobStatus, MemoryAuditLog, WorkerPool, WorkerSettings,
};
use serde_json::json;
use std::sync::Arc;
use support::{FakeModels, ScriptedDriver, build_ctx, seeded_store, story_job, storyboard_job};

fn settings() -> WorkerSettings {
    WorkerSettings::default()
}

#[tokio::test]
async fn pool_runs_enqueued_jobs_to_completion() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store.clone(),
        None,
    );

    let story_id = queue.enqueue(story_job("task-1", Some(10), json!({}))).await;
    let board_id = queue.enqueue(storyboard_job("task-2", Some(10))).await;

    let pool = WorkerPool::new(queue.clone(), ctx, settings());
    pool.run_until_idle().await;

    assert_eq!(queue.status(story_id).await, Some(JobStatus::Completed));
    assert_eq!(queue.status(board_id).await, Some(JobStatus::Completed));

    let result = queue.result(story_id).await.unwrap();
    assert_eq!(result["clip_count"], 2);
    assert_eq!(result["screenplay_success_count"], 2);
    assert_eq!(result["screenplay_failed_count"], 0);
}

#[tokio::test]
async fn newer_job_for_same_episode_supersedes_the_older_one() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store,
        None,
    );

    let stale_id = queue.enqueue(story_job("task-1", Some(10), json!({}))).await;
    let fresh_id = queue.enqueue(story_job("task-2", Some(10), json!({}))).await;

    let pool = WorkerPool::new(queue.clone(), ctx, settings());
    pool.run_until_idle().await;

    assert_eq!(queue.status(stale_id).await, Some(JobStatus::Failed));
    assert!(
        queue.error(stale_id).await.unwrap().contains("superseded"),
        "stale job fails with the supersession signal"
    );
    assert_eq!(queue.status(fresh_id).await, Some(JobStatus::Completed));
}

#[tokio::test]
async fn handler_validation_failure_marks_the_job_failed() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store,
        None,
    );

    let job_id = queue.enqueue(story_job("task-1", None, json!({}))).await;

    let pool = WorkerPool::new(queue.clone(), ctx, settings());
    pool.run_until_idle().await;

    assert_eq!(queue.status(job_id).await, Some(JobStatus::Failed));
    assert!(queue.error(job_id).await.unwrap().contains("episodeId is required"));
}

#[tokio::test]
async fn cancelled_pending_job_terminates_without_side_effects() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store.clone(),
        None,
    );

    let job_id = queue.enqueue(story_job("task-1", Some(10), json!({}))).await;
    queue.cancel(job_id).await;

    let pool = WorkerPool::new(queue.clone(), ctx, settings());
    pool.run_until_idle().await;

    assert_eq!(queue.status(job_id).await, Some(JobStatus::Failed));
    assert!(queue.error(job_id).await.unwrap().contains("cancelled"));
    assert_eq!(store.clip_count(10).await, 0);
}

#[tokio::test]
async fn claim_hands_each_job_to_exactly_one_worker() {
    let queue = Arc::new(InMemoryJobQueue::new());
    queue.enqueue(story_job("task-1", Some(10), json!({}))).await;

    let first = queue.claim().await.unwrap();
    let second = queue.claim().await.unwrap();
    assert!(first.is_some());
    assert!(second.is_none(), "a job can be claimed once");
}
