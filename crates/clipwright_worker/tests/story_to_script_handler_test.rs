//! Handler tests for story→script jobs: validation, model resolution,
//! partial failure, and transactional persistence.

mod support;

use async_trait::async_trait;
use clipwright_core::ProjectMode;
use clipwright_error::ClipwrightResult;
use clipwright_interface::{EpisodeRecord, EpisodeStore};
use clipwright_worker::{InMemoryJobQueue, MemoryAuditLog, handle_story_to_script_task};
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use support::{FakeModels, ScriptedDriver, build_ctx, seeded_store, story_job};

#[tokio::test]
async fn missing_episode_id_is_rejected_before_any_work() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let driver = Arc::new(ScriptedDriver::new());
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        driver.clone(),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store,
        None,
    );

    let job = story_job("task-1", None, json!({}));
    queue.enqueue(job.clone()).await;

    let err = handle_story_to_script_task(&ctx, &job).await.unwrap_err();
    assert!(err.to_string().contains("episodeId is required"));
    assert!(driver.models_used.lock().await.is_empty(), "no model call made");
}

#[tokio::test]
async fn wrong_project_mode_is_rejected() {
    let store = seeded_store(ProjectMode::ScriptImport, None).await;
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store,
        None,
    );

    let job = story_job("task-1", Some(10), json!({}));
    queue.enqueue(job.clone()).await;

    let err = handle_story_to_script_task(&ctx, &job).await.unwrap_err();
    assert!(err.to_string().contains("does not support task type"));
}

#[tokio::test]
async fn request_override_beats_project_and_fallback() {
    let store = seeded_store(ProjectMode::NovelPromotion, Some("project-model")).await;
    let driver = Arc::new(ScriptedDriver::new());
    let models = Arc::new(FakeModels::with_fallback("fallback-model"));
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        driver.clone(),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        models.clone(),
        store,
        None,
    );

    let job = story_job("task-1", Some(10), json!({"analysisModel": "override-model"}));
    queue.enqueue(job.clone()).await;

    handle_story_to_script_task(&ctx, &job).await.unwrap();
    assert_eq!(driver.last_model().await.as_deref(), Some("override-model"));
    assert!(models.calls.lock().await.is_empty(), "config source not consulted");
}

#[tokio::test]
async fn project_model_beats_fallback() {
    let store = seeded_store(ProjectMode::NovelPromotion, Some("project-model")).await;
    let driver = Arc::new(ScriptedDriver::new());
    let models = Arc::new(FakeModels::with_fallback("fallback-model"));
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        driver.clone(),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        models.clone(),
        store,
        None,
    );

    let job = story_job("task-1", Some(10), json!({}));
    queue.enqueue(job.clone()).await;

    handle_story_to_script_task(&ctx, &job).await.unwrap();
    assert_eq!(driver.last_model().await.as_deref(), Some("project-model"));
    assert!(models.calls.lock().await.is_empty());
}

#[tokio::test]
async fn unset_project_model_uses_resolved_fallback() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let driver = Arc::new(ScriptedDriver::new());
    let models = Arc::new(FakeModels::with_fallback("fallback-model"));
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        driver.clone(),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        models.clone(),
        store,
        None,
    );

    let job = story_job("task-1", Some(10), json!({}));
    queue.enqueue(job.clone()).await;

    handle_story_to_script_task(&ctx, &job)
        .await
        .expect("fallback model must be used, not rejected");
    assert_eq!(driver.last_model().await.as_deref(), Some("fallback-model"));
    assert_eq!(*models.calls.lock().await, vec![(1, 7)]);
}

#[tokio::test]
async fn no_model_anywhere_is_a_distinct_error() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::unconfigured()),
        store,
        None,
    );

    let job = story_job("task-1", Some(10), json!({}));
    queue.enqueue(job.clone()).await;

    let err = handle_story_to_script_task(&ctx, &job).await.unwrap_err();
    assert!(err.to_string().contains("analysisModel is not configured"));
}

#[tokio::test]
async fn partial_failure_surfaces_token_and_failing_clip() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    // The second clip's prompt contains its title, "Ambush".
    let driver = Arc::new(ScriptedDriver::failing_screenplay("Ambush"));
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        driver,
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store.clone(),
        None,
    );

    let job = story_job("task-1", Some(10), json!({}));
    queue.enqueue(job.clone()).await;

    let err = handle_story_to_script_task(&ctx, &job).await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("STORY_TO_SCRIPT_PARTIAL_FAILED"), "{}", message);
    assert!(message.contains("clip-2"), "preview names the failing clip: {}", message);

    assert_eq!(store.clip_count(10).await, 0, "nothing persisted on partial failure");
}

/// Episode store that vanishes after the first read, simulating deletion
/// while the job runs.
struct VanishingEpisodes {
    inner: Arc<clipwright_database::MemoryGenerationStore>,
    reads: AtomicUsize,
}

#[async_trait]
impl EpisodeStore for VanishingEpisodes {
    async fn episode(&self, episode_id: i64) -> ClipwrightResult<Option<EpisodeRecord>> {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.episode(episode_id).await
        } else {
            Ok(None)
        }
    }
}

#[tokio::test]
async fn episode_deleted_mid_run_fails_with_not_found() {
    let store = seeded_store(ProjectMode::NovelPromotion, None).await;
    let episodes = Arc::new(VanishingEpisodes {
        inner: store.clone(),
        reads: AtomicUsize::new(0),
    });
    let queue = Arc::new(InMemoryJobQueue::new());
    let ctx = build_ctx(
        Arc::new(ScriptedDriver::new()),
        queue.clone(),
        Arc::new(MemoryAuditLog::new()),
        Arc::new(FakeModels::with_fallback("fallback-model")),
        store.clone(),
        Some(episodes),
    );

    let job = story_job("task-1", Some(10), json!({}));
    queue.enqueue(job.clone()).await;

    let err = handle_story_to_script_task(&ctx, &job).await.unwrap_err();
    assert!(err.to_string().contains("NOT_FOUND"));
    assert_eq!(store.clip_count(10).await, 0);
}

#[tokio::test]
async fn successful_run_persists_and_returns_counts() {
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

    let job = story_job("task-1", Some(10), json!({"maxClipCount": 4}));
    let job_id = queue.enqueue(job.clone()).await;

    let result = handle_story_to_script_task(&ctx, &job).await.unwrap();
    assert_eq!(result.clip_count, 2);
    assert_eq!(result.screenplay_success_count, 2);
    assert_eq!(result.screenplay_failed_count, 0);
    assert_eq!(result.character_count, 1);

    assert_eq!(store.clip_count(10).await, 2);
    let episode = clipwright_interface::EpisodeStore::episode(store.as_ref(), 10)
        .await
        .unwrap()
        .unwrap();
    assert!(
        episode.script_text().as_deref().unwrap().contains("EXT. HARBOR - NIGHT"),
        "script text refreshed from the generation"
    );

    let history = queue.progress_history(job_id).await;
    assert!(!history.is_empty());
    for pair in history.windows(2) {
        assert!(pair[1] >= pair[0], "progress must never decrease: {:?}", history);
    }
}
