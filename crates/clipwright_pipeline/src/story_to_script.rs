//! Story→script workflow: novel text to per-clip screenplays.

use crate::extraction::parse_step_json;
use crate::prompts::prompt_ids;
use crate::step_runner::RunStep;
use clipwright_core::{Locale, StepMetadata};
use clipwright_error::{ClipwrightResult, JsonParseError};
use clipwright_interface::PromptLibrary;
use clipwright_interface::workflow::{
    CharacterProfile, ClipDraft, ClipScreenplay, ClipScreenplayOutcome, LocationProfile,
    StoryToScriptResult,
};
use std::collections::HashMap;

/// Fixed steps before the per-clip fan-out: characters, locations, clips.
const FIXED_STEPS: u32 = 3;
/// Clip count used for prompts when the job does not set one.
const DEFAULT_MAX_CLIPS: u32 = 12;
/// Output budget for analysis steps.
const ANALYSIS_MAX_TOKENS: u32 = 4096;
/// Output budget for per-clip screenplay conversion.
const SCREENPLAY_MAX_TOKENS: u32 = 8192;

/// Inputs for the story→script workflow.
#[derive(Debug, Clone)]
pub struct StoryToScriptInput {
    /// Target episode (used for logging only; the orchestrator never
    /// touches storage)
    pub episode_id: i64,
    /// The novel text to adapt
    pub novel_text: String,
    /// Locale for prompt templates
    pub locale: Locale,
    /// Optional cap on the number of clips segmentation may produce
    pub max_clip_count: Option<u32>,
}

/// Run the story→script workflow.
///
/// Sequence: character-profile extraction, location selection, clip
/// segmentation, then screenplay conversion once per clip. A failed clip
/// is recorded as a failed outcome and does not discard the other clips;
/// the cancellation signal is the one exception and is re-raised
/// immediately.
///
/// Assembly is deterministic: identical step outputs always produce an
/// identical result.
#[tracing::instrument(skip(steps, prompts, input), fields(episode_id = input.episode_id))]
pub async fn run_story_to_script(
    steps: &dyn RunStep,
    prompts: &dyn PromptLibrary,
    input: &StoryToScriptInput,
) -> ClipwrightResult<StoryToScriptResult> {
    let locale = input.locale;
    let max_clips = input.max_clip_count.unwrap_or(DEFAULT_MAX_CLIPS);

    // The step total is provisional until segmentation reveals the clip
    // count; the step runner's high-water mark keeps progress monotonic
    // across the revision.
    let provisional_total = FIXED_STEPS + 1;

    let mut vars = HashMap::new();
    vars.insert("novel_text".to_string(), input.novel_text.clone());

    let meta = StepMetadata::new("characters", "Character profiles", 0, provisional_total);
    let prompt = prompts.build(prompt_ids::STORY_CHARACTERS, locale, &vars)?;
    let output = steps
        .run_step(&meta, &prompt, "analyze_characters", ANALYSIS_MAX_TOKENS)
        .await?;
    let characters: Vec<CharacterProfile> =
        parse_step_json("character profiles", &output.text).map_err(log_parse_failure)?;

    let meta = StepMetadata::new("locations", "Location selection", 1, provisional_total);
    let prompt = prompts.build(prompt_ids::STORY_LOCATIONS, locale, &vars)?;
    let output = steps
        .run_step(&meta, &prompt, "select_locations", ANALYSIS_MAX_TOKENS)
        .await?;
    let locations: Vec<LocationProfile> =
        parse_step_json("location selection", &output.text).map_err(log_parse_failure)?;

    vars.insert("max_clips".to_string(), max_clips.to_string());
    let meta = StepMetadata::new("clips", "Clip segmentation", 2, provisional_total);
    let prompt = prompts.build(prompt_ids::STORY_CLIPS, locale, &vars)?;
    let output = steps
        .run_step(&meta, &prompt, "segment_clips", ANALYSIS_MAX_TOKENS)
        .await?;
    let mut clips: Vec<ClipDraft> =
        parse_step_json("clip segmentation", &output.text).map_err(log_parse_failure)?;
    if clips.is_empty() {
        return Err(JsonParseError::new(
            "clip segmentation",
            "expected at least one clip",
            output.text,
        )
        .into());
    }
    // Clip identity is positional; never trust ordinals from model output.
    for (i, clip) in clips.iter_mut().enumerate() {
        clip.clip_index = (i + 1) as u32;
    }

    let step_total = FIXED_STEPS + clips.len() as u32;
    let characters_block = characters_block(&characters);

    let mut screenplays = Vec::with_capacity(clips.len());
    for (i, clip) in clips.iter().enumerate() {
        let clip_id = clip.clip_id();
        let step_index = FIXED_STEPS + i as u32;
        match convert_clip(steps, prompts, locale, clip, &characters_block, step_index, step_total)
            .await
        {
            Ok(screenplay) => {
                screenplays.push(ClipScreenplayOutcome::ok(&clip_id, screenplay));
            }
            // The cancellation signal must not be rescued by per-clip
            // failure tolerance.
            Err(e) if e.is_termination() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    clip = %clip_id,
                    error = %e,
                    "clip screenplay conversion failed, continuing with remaining clips"
                );
                screenplays.push(ClipScreenplayOutcome::failed(&clip_id, e.to_string()));
            }
        }
    }

    let result = StoryToScriptResult::new(characters, locations, clips, screenplays);
    tracing::info!(
        clips = result.summary.clip_count,
        succeeded = result.summary.screenplay_success_count,
        failed = result.summary.screenplay_failed_count,
        "story→script workflow finished"
    );
    Ok(result)
}

async fn convert_clip(
    steps: &dyn RunStep,
    prompts: &dyn PromptLibrary,
    locale: Locale,
    clip: &ClipDraft,
    characters_block: &str,
    step_index: u32,
    step_total: u32,
) -> ClipwrightResult<ClipScreenplay> {
    let clip_id = clip.clip_id();
    let meta = StepMetadata::new(
        format!("screenplay-{}", clip_id),
        format!("Screenplay: {}", clip.title),
        step_index,
        step_total,
    );

    let mut vars = HashMap::new();
    vars.insert("clip_title".to_string(), clip.title.clone());
    vars.insert("clip_summary".to_string(), clip.summary.clone());
    vars.insert("clip_excerpt".to_string(), clip.source_excerpt.clone());
    vars.insert("characters".to_string(), characters_block.to_string());
    let prompt = prompts.build(prompt_ids::STORY_SCREENPLAY, locale, &vars)?;

    let output = steps
        .run_step(&meta, &prompt, "convert_screenplay", SCREENPLAY_MAX_TOKENS)
        .await?;
    parse_step_json(&format!("screenplay for {}", clip_id), &output.text)
}

/// Compact character context injected into screenplay prompts.
fn characters_block(characters: &[CharacterProfile]) -> String {
    characters
        .iter()
        .map(|c| format!("- {} ({}): {}", c.name, c.role, c.personality))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit the distinguished diagnostic for parse failures before they
/// propagate; the raw text is already in the audit log.
pub(crate) fn log_parse_failure(
    e: clipwright_error::ClipwrightError,
) -> clipwright_error::ClipwrightError {
    if let Some(parse) = e.as_json_parse() {
        tracing::error!(
            context = %parse.context,
            raw_length = parse.raw_text.len(),
            "model output failed structured parse"
        );
    }
    e
}
