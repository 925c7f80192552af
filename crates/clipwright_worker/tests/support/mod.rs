//! Shared fakes and fixtures for handler and pool tests.

#![allow(dead_code)]

use async_trait::async_trait;
use clipwright_core::{
    Completion, CompletionRequest, Locale, ProjectMode, ReasoningEffort, TaskJob, TaskType,
};
use clipwright_database::MemoryGenerationStore;
use clipwright_error::{ClipwrightResult, CompletionError};
use clipwright_interface::{
    AuditLog, CompletionDriver, EpisodeRecord, EpisodeStore, GenerationOptions,
    GenerationOptionsQuery, ModelConfigSource, ProjectModelConfig, ProjectRecord, ProjectStore,
    PromptLibrary, ScriptGenerationStore, StoryboardGenerationStore, TaskChannel,
};
use clipwright_pipeline::StaticPromptLibrary;
use clipwright_worker::{HandlerContext, InMemoryJobQueue};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::Mutex;

pub const CHARACTERS_JSON: &str = r#"[
  {"name": "Lin Yan", "role": "protagonist", "appearance": "tall", "personality": "stoic"}
]"#;

pub const LOCATIONS_JSON: &str = r#"[
  {"name": "Harbor", "description": "foggy docks", "mood": "tense"}
]"#;

pub const CLIPS_JSON: &str = r#"[
  {"title": "Arrival", "summary": "Lin Yan reaches the harbor.", "source_excerpt": "The ship groaned into port."},
  {"title": "Ambush", "summary": "Smugglers strike.", "source_excerpt": "Steel flashed in the fog."}
]"#;

pub const SCREENPLAY_JSON: &str = r#"{
  "scene_heading": "EXT. HARBOR - NIGHT",
  "lines": [{"speaker": "Lin Yan", "text": "We're late."}]
}"#;

pub const PLAN_JSON: &str = r#"[
  {
    "clip_id": "clip-1",
    "title": "Harbor arrival",
    "panels": [
      {"description": "Ship emerges from fog"},
      {"description": "Crowd gathers on the pier"}
    ]
  }
]"#;

pub const CAMERA_JSON: &str = r#"[
  {"panel_index": 1, "camera": "wide shot"},
  {"panel_index": 2, "camera": "close-up"}
]"#;

pub const ACTING_JSON: &str = r#"[
  {"panel_index": 1, "acting": "wary scan of the dock"},
  {"panel_index": 2, "acting": "shoulders through the crowd"}
]"#;

pub const DETAIL_JSON: &str = r#"{"detail": "Lantern light diffuses through sea fog."}"#;

pub const VOICE_JSON: &str = r#"[
  {"speaker": "Lin Yan", "text": "We're late.", "matched_panel": {"storyboard_index": 1, "panel_index": 1}},
  {"speaker": "Old Wei", "text": "The tide kept us honest.", "matched_panel": {"storyboard_index": 1, "panel_index": 2}}
]"#;

/// Driver that routes on prompt markers and supports targeted failure
/// injection for screenplay and voice steps.
pub struct ScriptedDriver {
    /// Fail screenplay conversion when the prompt contains this marker.
    pub fail_screenplay_containing: Option<String>,
    /// Fail this many leading voice-analysis calls before succeeding.
    pub fail_voice_attempts: u32,
    /// Count of voice-analysis calls that reached the driver.
    pub voice_calls: AtomicU32,
    /// Every model key the driver was asked to use.
    pub models_used: Mutex<Vec<String>>,
    /// When set, cancel this queue job upon seeing the voice prompt.
    pub cancel_on_voice: Mutex<Option<(Arc<InMemoryJobQueue>, i64)>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self {
            fail_screenplay_containing: None,
            fail_voice_attempts: 0,
            voice_calls: AtomicU32::new(0),
            models_used: Mutex::new(Vec::new()),
            cancel_on_voice: Mutex::new(None),
        }
    }

    pub fn failing_screenplay(marker: &str) -> Self {
        Self {
            fail_screenplay_containing: Some(marker.to_string()),
            ..Self::new()
        }
    }

    pub fn failing_voice_once() -> Self {
        Self {
            fail_voice_attempts: 1,
            ..Self::new()
        }
    }

    pub async fn cancel_job_on_voice(&self, queue: Arc<InMemoryJobQueue>, job_id: i64) {
        *self.cancel_on_voice.lock().await = Some((queue, job_id));
    }

    pub async fn last_model(&self) -> Option<String> {
        self.models_used.lock().await.last().cloned()
    }
}

impl Default for ScriptedDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionDriver for ScriptedDriver {
    async fn complete(
        &self,
        _user_id: i64,
        model_key: &str,
        req: &CompletionRequest,
    ) -> ClipwrightResult<Completion> {
        self.models_used.lock().await.push(model_key.to_string());
        let prompt = req
            .messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        if prompt.contains("significant character") {
            return Ok(Completion::from_text(CHARACTERS_JSON));
        }
        if prompt.contains("select the locations") {
            return Ok(Completion::from_text(LOCATIONS_JSON));
        }
        if prompt.contains("Segment the novel text") {
            return Ok(Completion::from_text(CLIPS_JSON));
        }
        if prompt.contains("screenplay format") {
            if let Some(marker) = &self.fail_screenplay_containing
                && prompt.contains(marker.as_str())
            {
                return Err(CompletionError::provider("model overloaded").into());
            }
            return Ok(Completion::from_text(SCREENPLAY_JSON));
        }
        if prompt.contains("Plan storyboards") {
            return Ok(Completion::from_text(PLAN_JSON));
        }
        if prompt.contains("camera direction") {
            return Ok(Completion::from_text(CAMERA_JSON));
        }
        if prompt.contains("acting direction") {
            return Ok(Completion::from_text(ACTING_JSON));
        }
        if prompt.contains("detailed visual description") {
            return Ok(Completion::from_text(DETAIL_JSON));
        }
        if prompt.contains("spoken line") {
            let call = self.voice_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((queue, job_id)) = self.cancel_on_voice.lock().await.clone() {
                queue.cancel(job_id).await;
                return Err(CompletionError::provider("voice model crashed").into());
            }
            if call <= self.fail_voice_attempts {
                return Err(CompletionError::provider("voice model hiccup").into());
            }
            return Ok(Completion::from_text(VOICE_JSON));
        }

        Err(CompletionError::provider(format!("unrecognized prompt: {}", prompt)).into())
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }
}

/// Config source with a configurable user-preference fallback and call
/// recording.
pub struct FakeModels {
    pub fallback: Option<String>,
    pub calls: Mutex<Vec<(i64, i64)>>,
}

impl FakeModels {
    pub fn with_fallback(model: &str) -> Self {
        Self {
            fallback: Some(model.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ModelConfigSource for FakeModels {
    async fn project_model_config(
        &self,
        project_id: i64,
        user_id: i64,
    ) -> ClipwrightResult<ProjectModelConfig> {
        self.calls.lock().await.push((project_id, user_id));
        Ok(ProjectModelConfig {
            analysis_model: self.fallback.clone(),
        })
    }

    async fn generation_options(
        &self,
        _query: &GenerationOptionsQuery,
    ) -> ClipwrightResult<GenerationOptions> {
        Ok(GenerationOptions {
            reasoning_effort: Some(ReasoningEffort::Medium),
        })
    }
}

/// Seed a project (optionally with a project-level model) and an episode
/// carrying both novel and script text.
pub async fn seeded_store(
    mode: ProjectMode,
    project_model: Option<&str>,
) -> Arc<MemoryGenerationStore> {
    let store = Arc::new(MemoryGenerationStore::new());
    store
        .insert_project(ProjectRecord::new(
            1,
            "Harbor Novel",
            mode,
            project_model.map(str::to_string),
        ))
        .await;
    store
        .insert_episode(EpisodeRecord::new(
            10,
            1,
            "Episode 1",
            Some("The ship groaned into port. Steel flashed in the fog.".to_string()),
            Some("EXT. HARBOR - NIGHT\nLIN YAN: We're late.".to_string()),
        ))
        .await;
    store
}

/// Assemble a handler context; the memory store backs every store trait
/// unless an episode-store override is supplied.
pub fn build_ctx(
    driver: Arc<ScriptedDriver>,
    queue: Arc<InMemoryJobQueue>,
    audit: Arc<dyn AuditLog>,
    models: Arc<FakeModels>,
    store: Arc<MemoryGenerationStore>,
    episodes_override: Option<Arc<dyn EpisodeStore>>,
) -> HandlerContext {
    let episodes: Arc<dyn EpisodeStore> = match episodes_override {
        Some(episodes) => episodes,
        None => store.clone(),
    };
    HandlerContext::builder()
        .driver(driver as Arc<dyn CompletionDriver>)
        .channel(queue as Arc<dyn TaskChannel>)
        .audit(audit)
        .prompts(Arc::new(StaticPromptLibrary::new()) as Arc<dyn PromptLibrary>)
        .models(models as Arc<dyn ModelConfigSource>)
        .projects(store.clone() as Arc<dyn ProjectStore>)
        .episodes(episodes)
        .scripts(store.clone() as Arc<dyn ScriptGenerationStore>)
        .storyboards(store as Arc<dyn StoryboardGenerationStore>)
        .build()
        .expect("context with all collaborators set")
}

/// A job for the story→script workflow.
pub fn story_job(task_id: &str, episode_id: Option<i64>, payload: serde_json::Value) -> TaskJob {
    TaskJob::builder()
        .task_id(task_id)
        .task_type(TaskType::StoryToScript)
        .project_id(1_i64)
        .episode_id(episode_id)
        .payload(payload)
        .user_id(7_i64)
        .locale(Locale::En)
        .build()
        .expect("valid job")
}

/// A job for the script→storyboard workflow.
pub fn storyboard_job(task_id: &str, episode_id: Option<i64>) -> TaskJob {
    TaskJob::builder()
        .task_id(task_id)
        .task_type(TaskType::ScriptToStoryboard)
        .project_id(1_i64)
        .episode_id(episode_id)
        .payload(serde_json::json!({}))
        .user_id(7_i64)
        .locale(Locale::En)
        .build()
        .expect("valid job")
}
