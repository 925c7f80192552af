//! Diesel row models for generation persistence.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;

/// Database row for the projects table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub mode: String,
    pub analysis_model: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for the episodes table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::episodes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EpisodeRow {
    pub id: i64,
    pub project_id: i64,
    pub title: String,
    pub novel_text: Option<String>,
    pub script_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Database row for the characters table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::characters)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CharacterRow {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub role: String,
    pub appearance: String,
    pub personality: String,
    pub updated_at: DateTime<Utc>,
}

/// Insertable character row; upserted by `(project_id, name)`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::characters)]
pub struct NewCharacterRow {
    pub project_id: i64,
    pub name: String,
    pub role: String,
    pub appearance: String,
    pub personality: String,
}

/// Database row for the locations table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::locations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LocationRow {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub mood: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable location row; upserted by `(project_id, name)`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::locations)]
pub struct NewLocationRow {
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub mood: Option<String>,
}

/// Database row for the clips table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::clips)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClipRow {
    pub id: i64,
    pub episode_id: i64,
    pub clip_index: i32,
    pub title: String,
    pub summary: String,
    pub source_excerpt: String,
    pub screenplay: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Insertable clip row; clips are fully replaced per generation run.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::clips)]
pub struct NewClipRow {
    pub episode_id: i64,
    pub clip_index: i32,
    pub title: String,
    pub summary: String,
    pub source_excerpt: String,
    pub screenplay: Option<serde_json::Value>,
}

/// Database row for the storyboards table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::storyboards)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryboardRow {
    pub id: i64,
    pub episode_id: i64,
    pub clip_ref: String,
    pub storyboard_index: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// Insertable storyboard row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::storyboards)]
pub struct NewStoryboardRow {
    pub episode_id: i64,
    pub clip_ref: String,
    pub storyboard_index: i32,
    pub title: String,
}

/// Database row for the panels table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::panels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PanelRow {
    pub id: i64,
    pub storyboard_id: i64,
    pub panel_index: i32,
    pub description: String,
    pub camera: Option<String>,
    pub acting: Option<String>,
    pub detail: Option<String>,
}

/// Insertable panel row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::panels)]
pub struct NewPanelRow {
    pub storyboard_id: i64,
    pub panel_index: i32,
    pub description: String,
    pub camera: Option<String>,
    pub acting: Option<String>,
    pub detail: Option<String>,
}

/// Database row for the voice_lines table.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize)]
#[diesel(table_name = crate::schema::voice_lines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VoiceLineRow {
    pub id: i64,
    pub episode_id: i64,
    pub line_index: i32,
    pub speaker: String,
    pub content: String,
    pub matched_panel_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Insertable voice-line row.
///
/// `matched_panel_id` always points at a panel created by the same
/// transaction; the store resolves it from the run's in-transaction
/// lookup map, never from pre-transaction state.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::voice_lines)]
pub struct NewVoiceLineRow {
    pub episode_id: i64,
    pub line_index: i32,
    pub speaker: String,
    pub content: String,
    pub matched_panel_id: Option<i64>,
}
