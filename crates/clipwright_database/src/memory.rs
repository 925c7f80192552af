//! Memory-backed generation store for tests and database-free runs.

use crate::validate::{validate_script_result, validate_storyboard_result};

use async_trait::async_trait;
use clipwright_error::{ClipwrightResult, DatabaseError, DatabaseErrorKind};
use clipwright_interface::workflow::{
    ScriptToStoryboardResult, StoryToScriptResult, StoryboardDraft,
};
use clipwright_interface::{
    EpisodeRecord, EpisodeStore, ProjectRecord, ProjectStore, ScriptGenerationStore,
    ScriptPersistReport, StoryboardGenerationStore, StoryboardPersistReport,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A voice line as persisted, with its resolved panel id.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedVoiceLine {
    /// Positional identity within the episode
    pub line_index: i32,
    /// Speaking character
    pub speaker: String,
    /// Spoken text
    pub text: String,
    /// Resolved panel id from the same persistence run
    pub matched_panel_id: Option<i64>,
}

#[derive(Debug, Clone)]
#[allow(dead_code)]
struct PersistedClip {
    episode_id: i64,
    clip_index: u32,
    screenplay_json: serde_json::Value,
}

#[derive(Default)]
struct MemoryState {
    projects: HashMap<i64, ProjectRecord>,
    episodes: HashMap<i64, EpisodeRecord>,
    characters: HashMap<(i64, String), (String, String, String)>,
    locations: HashMap<(i64, String), (String, Option<String>)>,
    clips: Vec<PersistedClip>,
    storyboards: HashMap<i64, Vec<StoryboardDraft>>,
    panel_ids: HashMap<i64, HashMap<(i32, i32), i64>>,
    voice_lines: HashMap<i64, Vec<PersistedVoiceLine>>,
    next_panel_id: i64,
}

/// In-memory implementation of the generation store contracts.
///
/// Mirrors the transactional semantics of the PostgreSQL store: validation
/// happens before any mutation, writes are all-or-nothing, and the
/// replace operations are full-replace.
#[derive(Default)]
pub struct MemoryGenerationStore {
    state: RwLock<MemoryState>,
}

impl MemoryGenerationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project.
    pub async fn insert_project(&self, project: ProjectRecord) {
        self.state.write().await.projects.insert(*project.id(), project);
    }

    /// Seed an episode.
    pub async fn insert_episode(&self, episode: EpisodeRecord) {
        self.state.write().await.episodes.insert(*episode.id(), episode);
    }

    /// Delete an episode, simulating a target vanishing mid-run.
    pub async fn remove_episode(&self, episode_id: i64) {
        self.state.write().await.episodes.remove(&episode_id);
    }

    /// Voice lines currently persisted for an episode.
    pub async fn voice_lines(&self, episode_id: i64) -> Vec<PersistedVoiceLine> {
        self.state
            .read()
            .await
            .voice_lines
            .get(&episode_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Clips currently persisted for an episode.
    pub async fn clip_count(&self, episode_id: i64) -> usize {
        self.state
            .read()
            .await
            .clips
            .iter()
            .filter(|clip| clip.episode_id == episode_id)
            .count()
    }

    /// Storyboards currently persisted for an episode.
    pub async fn storyboard_count(&self, episode_id: i64) -> usize {
        self.state
            .read()
            .await
            .storyboards
            .get(&episode_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl ProjectStore for MemoryGenerationStore {
    async fn project(&self, project_id: i64) -> ClipwrightResult<Option<ProjectRecord>> {
        Ok(self.state.read().await.projects.get(&project_id).cloned())
    }
}

#[async_trait]
impl EpisodeStore for MemoryGenerationStore {
    async fn episode(&self, episode_id: i64) -> ClipwrightResult<Option<EpisodeRecord>> {
        Ok(self.state.read().await.episodes.get(&episode_id).cloned())
    }
}

#[async_trait]
impl ScriptGenerationStore for MemoryGenerationStore {
    async fn replace_script_generation(
        &self,
        episode_id: i64,
        result: &StoryToScriptResult,
    ) -> ClipwrightResult<ScriptPersistReport> {
        validate_script_result(result)?;
        let script_text = result.render_script_text();

        let mut state = self.state.write().await;
        let Some(episode) = state.episodes.get(&episode_id).cloned() else {
            return Err(episode_missing(episode_id).into());
        };
        let project_id = *episode.project_id();

        // Build the replacement clip set before mutating anything so a
        // serialization failure leaves prior rows untouched.
        let mut new_clips = Vec::with_capacity(result.clips.len());
        for (clip, outcome) in result.clips.iter().zip(&result.screenplays) {
            let screenplay_json =
                serde_json::to_value(&outcome.screenplay).map_err(|e| {
                    DatabaseError::new(DatabaseErrorKind::InvalidRow {
                        table: "clips".to_string(),
                        reason: format!("screenplay not serializable: {}", e),
                    })
                })?;
            new_clips.push(PersistedClip {
                episode_id,
                clip_index: clip.clip_index,
                screenplay_json,
            });
        }

        for character in &result.characters {
            state.characters.insert(
                (project_id, character.name.clone()),
                (
                    character.role.clone(),
                    character.appearance.clone(),
                    character.personality.clone(),
                ),
            );
        }
        for location in &result.locations {
            state.locations.insert(
                (project_id, location.name.clone()),
                (location.description.clone(), location.mood.clone()),
            );
        }

        state.clips.retain(|clip| clip.episode_id != episode_id);
        state.clips.extend(new_clips);

        let refreshed = EpisodeRecord::new(
            episode_id,
            project_id,
            episode.title().clone(),
            episode.novel_text().clone(),
            Some(script_text),
        );
        state.episodes.insert(episode_id, refreshed);

        Ok(ScriptPersistReport::new(
            result.characters.len(),
            result.locations.len(),
            result.clips.len(),
        ))
    }
}

#[async_trait]
impl StoryboardGenerationStore for MemoryGenerationStore {
    async fn replace_storyboard_generation(
        &self,
        episode_id: i64,
        result: &ScriptToStoryboardResult,
    ) -> ClipwrightResult<StoryboardPersistReport> {
        validate_storyboard_result(result)?;

        let mut state = self.state.write().await;
        if !state.episodes.contains_key(&episode_id) {
            return Err(episode_missing(episode_id).into());
        }

        // Assign panel ids exactly as the transactional store does, from
        // this run's inserts, then resolve voice lines against that map
        // before committing anything.
        let mut panel_ids: HashMap<(i32, i32), i64> = HashMap::new();
        let mut panel_count = 0usize;
        let mut next_panel_id = state.next_panel_id;
        for storyboard in &result.storyboards {
            for panel in &storyboard.panels {
                next_panel_id += 1;
                panel_ids.insert((storyboard.storyboard_index, panel.panel_index), next_panel_id);
                panel_count += 1;
            }
        }

        let mut new_lines = Vec::with_capacity(result.voice_lines.len());
        for line in &result.voice_lines {
            let matched_panel_id = match &line.matched_panel {
                None => None,
                Some(panel_ref) => {
                    let key = (panel_ref.storyboard_index, panel_ref.panel_index);
                    match panel_ids.get(&key) {
                        Some(panel_id) => Some(*panel_id),
                        None => {
                            return Err(DatabaseError::new(
                                DatabaseErrorKind::OrphanVoiceLine {
                                    line_index: line.line_index,
                                    storyboard_index: panel_ref.storyboard_index,
                                    panel_index: panel_ref.panel_index,
                                },
                            )
                            .into());
                        }
                    }
                }
            };
            new_lines.push(PersistedVoiceLine {
                line_index: line.line_index,
                speaker: line.speaker.clone(),
                text: line.text.clone(),
                matched_panel_id,
            });
        }

        state.next_panel_id = next_panel_id;
        state.storyboards.insert(episode_id, result.storyboards.clone());
        state.panel_ids.insert(episode_id, panel_ids);
        state.voice_lines.insert(episode_id, new_lines);

        Ok(StoryboardPersistReport::new(
            result.storyboards.len(),
            panel_count,
            result.voice_lines.len(),
        ))
    }
}

fn episode_missing(episode_id: i64) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Query(format!(
        "episode {} does not exist",
        episode_id
    )))
}
