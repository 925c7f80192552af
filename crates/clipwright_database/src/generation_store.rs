//! PostgreSQL implementation of the generation stores.

use crate::models::{
    EpisodeRow, NewCharacterRow, NewClipRow, NewLocationRow, NewPanelRow, NewStoryboardRow,
    NewVoiceLineRow, PanelRow, ProjectRow, StoryboardRow,
};
use crate::validate::{validate_script_result, validate_storyboard_result};

use async_trait::async_trait;
use clipwright_core::ProjectMode;
use clipwright_error::{ClipwrightResult, DatabaseError, DatabaseErrorKind};
use clipwright_interface::workflow::{ScriptToStoryboardResult, StoryToScriptResult};
use clipwright_interface::{
    EpisodeRecord, EpisodeStore, ProjectRecord, ProjectStore, ScriptGenerationStore,
    ScriptPersistReport, StoryboardGenerationStore, StoryboardPersistReport,
};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Default bound on how long a persistence transaction may hold locks.
const DEFAULT_STATEMENT_TIMEOUT_MS: u32 = 15_000;

/// PostgreSQL implementation of the generation stores using Diesel.
///
/// All multi-row writes for a job happen inside a single transaction with
/// a bounded statement timeout; derived rows use delete-then-recreate
/// semantics rather than incremental diffs.
///
/// # Example
/// ```no_run
/// use clipwright_database::{PostgresGenerationStore, establish_connection};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = establish_connection()?;
/// let store = PostgresGenerationStore::new(conn);
/// // Use store.replace_script_generation(), etc.
/// # Ok(())
/// # }
/// ```
pub struct PostgresGenerationStore {
    /// Database connection wrapped in Arc<Mutex> for async safety.
    ///
    /// A single connection suffices for a worker that persists one job at
    /// a time; use one store per worker rather than sharing across the
    /// pool.
    conn: Arc<Mutex<PgConnection>>,
    statement_timeout_ms: u32,
}

impl PostgresGenerationStore {
    /// Create a store with the default transaction timeout.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            statement_timeout_ms: DEFAULT_STATEMENT_TIMEOUT_MS,
        }
    }

    /// Override the bounded transaction timeout.
    pub fn with_statement_timeout(mut self, timeout_ms: u32) -> Self {
        self.statement_timeout_ms = timeout_ms;
        self
    }

    fn apply_timeout(&self, conn: &mut PgConnection) -> Result<(), diesel::result::Error> {
        diesel::sql_query(format!(
            "SET LOCAL statement_timeout = {}",
            self.statement_timeout_ms
        ))
        .execute(conn)
        .map(|_| ())
    }
}

fn query_error(e: diesel::result::Error) -> DatabaseError {
    DatabaseError::new(DatabaseErrorKind::Query(e.to_string()))
}

#[async_trait]
impl ProjectStore for PostgresGenerationStore {
    async fn project(&self, project_id: i64) -> ClipwrightResult<Option<ProjectRecord>> {
        use crate::schema::projects::dsl;

        let mut conn = self.conn.lock().await;
        let row: Option<ProjectRow> = dsl::projects
            .find(project_id)
            .first(&mut *conn)
            .optional()
            .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mode = ProjectMode::from_str(&row.mode).map_err(|_| {
            DatabaseError::new(DatabaseErrorKind::InvalidRow {
                table: "projects".to_string(),
                reason: format!("unknown project mode '{}'", row.mode),
            })
        })?;
        Ok(Some(ProjectRecord::new(
            row.id,
            row.name,
            mode,
            row.analysis_model,
        )))
    }
}

#[async_trait]
impl EpisodeStore for PostgresGenerationStore {
    async fn episode(&self, episode_id: i64) -> ClipwrightResult<Option<EpisodeRecord>> {
        use crate::schema::episodes::dsl;

        let mut conn = self.conn.lock().await;
        let row: Option<EpisodeRow> = dsl::episodes
            .find(episode_id)
            .first(&mut *conn)
            .optional()
            .map_err(query_error)?;

        Ok(row.map(|row| {
            EpisodeRecord::new(row.id, row.project_id, row.title, row.novel_text, row.script_text)
        }))
    }
}

#[async_trait]
impl ScriptGenerationStore for PostgresGenerationStore {
    #[tracing::instrument(skip(self, result), fields(clips = result.clips.len()))]
    async fn replace_script_generation(
        &self,
        episode_id: i64,
        result: &StoryToScriptResult,
    ) -> ClipwrightResult<ScriptPersistReport> {
        // All shape validation happens before the transaction opens, so a
        // malformed result never holds locks.
        validate_script_result(result)?;
        let script_text = result.render_script_text();

        let mut conn = self.conn.lock().await;
        let mut abort: Option<DatabaseError> = None;

        let report = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                use crate::schema::{characters, clips, episodes, locations};

                self.apply_timeout(conn)?;

                // The episode row anchors project scoping; a concurrent
                // delete surfaces here instead of as a foreign-key error.
                let episode: EpisodeRow = episodes::table.find(episode_id).first(conn)?;
                let project_id = episode.project_id;

                for character in &result.characters {
                    let new_row = NewCharacterRow {
                        project_id,
                        name: character.name.clone(),
                        role: character.role.clone(),
                        appearance: character.appearance.clone(),
                        personality: character.personality.clone(),
                    };
                    diesel::insert_into(characters::table)
                        .values(&new_row)
                        .on_conflict((characters::project_id, characters::name))
                        .do_update()
                        .set((
                            characters::role.eq(excluded(characters::role)),
                            characters::appearance.eq(excluded(characters::appearance)),
                            characters::personality.eq(excluded(characters::personality)),
                        ))
                        .execute(conn)?;
                }

                for location in &result.locations {
                    let new_row = NewLocationRow {
                        project_id,
                        name: location.name.clone(),
                        description: location.description.clone(),
                        mood: location.mood.clone(),
                    };
                    diesel::insert_into(locations::table)
                        .values(&new_row)
                        .on_conflict((locations::project_id, locations::name))
                        .do_update()
                        .set((
                            locations::description.eq(excluded(locations::description)),
                            locations::mood.eq(excluded(locations::mood)),
                        ))
                        .execute(conn)?;
                }

                // Full replace: clip identity is positional, so the old
                // set is deleted wholesale rather than diffed.
                diesel::delete(clips::table.filter(clips::episode_id.eq(episode_id)))
                    .execute(conn)?;

                for (clip, outcome) in result.clips.iter().zip(&result.screenplays) {
                    let screenplay_json = match serde_json::to_value(&outcome.screenplay) {
                        Ok(value) => Some(value),
                        Err(e) => {
                            abort = Some(DatabaseError::new(DatabaseErrorKind::InvalidRow {
                                table: "clips".to_string(),
                                reason: format!("screenplay not serializable: {}", e),
                            }));
                            return Err(diesel::result::Error::RollbackTransaction);
                        }
                    };
                    let new_row = NewClipRow {
                        episode_id,
                        clip_index: clip.clip_index as i32,
                        title: clip.title.clone(),
                        summary: clip.summary.clone(),
                        source_excerpt: clip.source_excerpt.clone(),
                        screenplay: screenplay_json,
                    };
                    diesel::insert_into(clips::table).values(&new_row).execute(conn)?;
                }

                diesel::update(episodes::table.find(episode_id))
                    .set(episodes::script_text.eq(Some(script_text.clone())))
                    .execute(conn)?;

                Ok(ScriptPersistReport::new(
                    result.characters.len(),
                    result.locations.len(),
                    result.clips.len(),
                ))
            })
            .map_err(|e| match abort.take() {
                Some(custom) => custom,
                None => query_error(e),
            })?;

        tracing::info!(
            characters = report.character_count,
            locations = report.location_count,
            clips = report.clip_count,
            "script generation persisted"
        );
        Ok(report)
    }
}

#[async_trait]
impl StoryboardGenerationStore for PostgresGenerationStore {
    #[tracing::instrument(
        skip(self, result),
        fields(
            storyboards = result.storyboards.len(),
            voice_lines = result.voice_lines.len(),
        )
    )]
    async fn replace_storyboard_generation(
        &self,
        episode_id: i64,
        result: &ScriptToStoryboardResult,
    ) -> ClipwrightResult<StoryboardPersistReport> {
        // Shape validation, including the draft-level orphan check, runs
        // before any row is touched.
        validate_storyboard_result(result)?;

        let mut conn = self.conn.lock().await;
        let mut abort: Option<DatabaseError> = None;

        let report = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                use crate::schema::{episodes, panels, storyboards, voice_lines};

                self.apply_timeout(conn)?;

                // Anchor on the episode so a mid-run delete aborts cleanly.
                let _episode: EpisodeRow = episodes::table.find(episode_id).first(conn)?;

                // Full replace: voice lines, panels, storyboards, in
                // dependency order.
                diesel::delete(
                    voice_lines::table.filter(voice_lines::episode_id.eq(episode_id)),
                )
                .execute(conn)?;
                diesel::delete(
                    panels::table.filter(
                        panels::storyboard_id.eq_any(
                            storyboards::table
                                .filter(storyboards::episode_id.eq(episode_id))
                                .select(storyboards::id),
                        ),
                    ),
                )
                .execute(conn)?;
                diesel::delete(
                    storyboards::table.filter(storyboards::episode_id.eq(episode_id)),
                )
                .execute(conn)?;

                // Insert storyboards, keeping the ordinal → id mapping from
                // the rows this transaction just created.
                let mut storyboard_ids: HashMap<i32, i64> = HashMap::new();
                for draft in &result.storyboards {
                    let new_row = NewStoryboardRow {
                        episode_id,
                        clip_ref: draft.clip_id.clone(),
                        storyboard_index: draft.storyboard_index,
                        title: draft.title.clone(),
                    };
                    let row: StoryboardRow = diesel::insert_into(storyboards::table)
                        .values(&new_row)
                        .get_result(conn)?;
                    storyboard_ids.insert(draft.storyboard_index, row.id);
                }

                // Insert panels, building the composite-key lookup map from
                // the returned rows — never from pre-transaction state.
                let mut panel_ids: HashMap<(i64, i32), i64> = HashMap::new();
                let mut panel_count = 0usize;
                for draft in &result.storyboards {
                    let storyboard_id = storyboard_ids[&draft.storyboard_index];
                    for panel in &draft.panels {
                        let new_row = NewPanelRow {
                            storyboard_id,
                            panel_index: panel.panel_index,
                            description: panel.description.clone(),
                            camera: panel.camera.clone(),
                            acting: panel.acting.clone(),
                            detail: panel.detail.clone(),
                        };
                        let row: PanelRow = diesel::insert_into(panels::table)
                            .values(&new_row)
                            .get_result(conn)?;
                        panel_ids.insert((storyboard_id, row.panel_index), row.id);
                        panel_count += 1;
                    }
                }

                for line in &result.voice_lines {
                    let matched_panel_id = match &line.matched_panel {
                        None => None,
                        Some(panel_ref) => {
                            let resolved = storyboard_ids
                                .get(&panel_ref.storyboard_index)
                                .and_then(|sid| panel_ids.get(&(*sid, panel_ref.panel_index)));
                            match resolved {
                                Some(panel_id) => Some(*panel_id),
                                // Unresolvable here means the draft check
                                // missed a corruption; abort everything.
                                None => {
                                    abort = Some(DatabaseError::new(
                                        DatabaseErrorKind::OrphanVoiceLine {
                                            line_index: line.line_index,
                                            storyboard_index: panel_ref.storyboard_index,
                                            panel_index: panel_ref.panel_index,
                                        },
                                    ));
                                    return Err(diesel::result::Error::RollbackTransaction);
                                }
                            }
                        }
                    };
                    let new_row = NewVoiceLineRow {
                        episode_id,
                        line_index: line.line_index,
                        speaker: line.speaker.clone(),
                        content: line.text.clone(),
                        matched_panel_id,
                    };
                    diesel::insert_into(voice_lines::table)
                        .values(&new_row)
                        .execute(conn)?;
                }

                Ok(StoryboardPersistReport::new(
                    result.storyboards.len(),
                    panel_count,
                    result.voice_lines.len(),
                ))
            })
            .map_err(|e| match abort.take() {
                Some(custom) => custom,
                None => query_error(e),
            })?;

        tracing::info!(
            storyboards = report.storyboard_count,
            panels = report.panel_count,
            voice_lines = report.voice_line_count,
            "storyboard generation persisted"
        );
        Ok(report)
    }
}
