//! Shape validation for generated rows.
//!
//! Generated content that fails basic shape validation is never persisted
//! with guessed defaults; a malformed field aborts the whole persistence
//! call before any row is written.

use crate::DatabaseResult;
use clipwright_error::{DatabaseError, DatabaseErrorKind};
use clipwright_interface::workflow::{ScriptToStoryboardResult, StoryToScriptResult};
use std::collections::HashSet;

pub(crate) fn require_non_empty(table: &str, field: &str, value: &str) -> DatabaseResult<()> {
    if value.trim().is_empty() {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidRow {
            table: table.to_string(),
            reason: format!("{} must not be empty", field),
        }));
    }
    Ok(())
}

pub(crate) fn require_positive(table: &str, field: &str, value: i64) -> DatabaseResult<()> {
    if value < 1 {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidRow {
            table: table.to_string(),
            reason: format!("{} must be positive, got {}", field, value),
        }));
    }
    Ok(())
}

/// Validate a story→script result before any row is written.
pub(crate) fn validate_script_result(result: &StoryToScriptResult) -> DatabaseResult<()> {
    for character in &result.characters {
        require_non_empty("characters", "name", &character.name)?;
    }
    for location in &result.locations {
        require_non_empty("locations", "name", &location.name)?;
    }
    for clip in &result.clips {
        require_positive("clips", "clip_index", clip.clip_index as i64)?;
        require_non_empty("clips", "title", &clip.title)?;
    }
    for outcome in &result.screenplays {
        // The handler gates on the partial-failure summary before
        // persisting; a failure outcome reaching this layer is corrupt.
        if !outcome.success || outcome.screenplay.is_none() {
            return Err(DatabaseError::new(DatabaseErrorKind::InvalidRow {
                table: "clips".to_string(),
                reason: format!("clip {} has no successful screenplay", outcome.clip_id),
            }));
        }
    }
    Ok(())
}

/// Validate a script→storyboard result before any row is written.
///
/// Includes the orphan check: every `matched_panel` reference must resolve
/// against the panels of this same result.
pub(crate) fn validate_storyboard_result(result: &ScriptToStoryboardResult) -> DatabaseResult<()> {
    let mut panel_keys: HashSet<(i32, i32)> = HashSet::new();
    for storyboard in &result.storyboards {
        require_positive(
            "storyboards",
            "storyboard_index",
            storyboard.storyboard_index as i64,
        )?;
        require_non_empty("storyboards", "clip_ref", &storyboard.clip_id)?;
        for panel in &storyboard.panels {
            require_positive("panels", "panel_index", panel.panel_index as i64)?;
            require_non_empty("panels", "description", &panel.description)?;
            panel_keys.insert((storyboard.storyboard_index, panel.panel_index));
        }
    }

    for line in &result.voice_lines {
        require_positive("voice_lines", "line_index", line.line_index as i64)?;
        require_non_empty("voice_lines", "speaker", &line.speaker)?;
        require_non_empty("voice_lines", "content", &line.text)?;
        if let Some(panel_ref) = &line.matched_panel
            && !panel_keys.contains(&(panel_ref.storyboard_index, panel_ref.panel_index))
        {
            return Err(DatabaseError::new(DatabaseErrorKind::OrphanVoiceLine {
                line_index: line.line_index,
                storyboard_index: panel_ref.storyboard_index,
                panel_index: panel_ref.panel_index,
            }));
        }
    }
    Ok(())
}
