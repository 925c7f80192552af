//! Script→storyboard workflow: screenplay to storyboards, panels, and
//! voice lines.

use crate::extraction::parse_step_json;
use crate::prompts::prompt_ids;
use crate::step_runner::RunStep;
use crate::story_to_script::log_parse_failure;
use clipwright_core::{Locale, StepMetadata};
use clipwright_error::{ClipwrightResult, JsonParseError};
use clipwright_interface::PromptLibrary;
use clipwright_interface::workflow::{PanelDraft, StoryboardDraft, VoiceLineDraft};
use serde::Deserialize;
use std::collections::HashMap;

/// Output budget for planning and per-unit direction steps.
const DIRECTION_MAX_TOKENS: u32 = 4096;
/// Output budget for per-panel detail expansion.
const DETAIL_MAX_TOKENS: u32 = 1024;

/// Inputs for the script→storyboard workflow.
#[derive(Debug, Clone)]
pub struct ScriptToStoryboardInput {
    /// Target episode (logging only)
    pub episode_id: i64,
    /// The assembled screenplay text
    pub script_text: String,
    /// Locale for prompt templates
    pub locale: Locale,
}

#[derive(Debug, Deserialize)]
struct CameraPatch {
    panel_index: i32,
    camera: String,
}

#[derive(Debug, Deserialize)]
struct ActingPatch {
    panel_index: i32,
    acting: String,
}

#[derive(Debug, Deserialize)]
struct PanelDetail {
    detail: String,
}

/// Run the storyboard construction steps: planning, then cinematography and
/// acting per storyboard unit, then detail expansion per panel.
///
/// Unlike story→script's per-clip tolerance, this workflow is fail-fast: a
/// bad unit aborts the run, because later steps build on earlier fields.
/// Parse failures carry the raw model text and are logged distinctly on
/// the way out.
#[tracing::instrument(skip(steps, prompts, input), fields(episode_id = input.episode_id))]
pub async fn run_script_to_storyboard(
    steps: &dyn RunStep,
    prompts: &dyn PromptLibrary,
    input: &ScriptToStoryboardInput,
) -> ClipwrightResult<Vec<StoryboardDraft>> {
    let locale = input.locale;

    let mut vars = HashMap::new();
    vars.insert("script_text".to_string(), input.script_text.clone());
    let meta = StepMetadata::new("storyboard-plan", "Storyboard planning", 0, 2);
    let prompt = prompts.build(prompt_ids::BOARD_PLAN, locale, &vars)?;
    let output = steps
        .run_step(&meta, &prompt, "plan_storyboards", DIRECTION_MAX_TOKENS)
        .await?;
    let mut storyboards: Vec<StoryboardDraft> =
        parse_step_json("storyboard planning", &output.text).map_err(log_parse_failure)?;
    if storyboards.is_empty() {
        return Err(JsonParseError::new(
            "storyboard planning",
            "expected at least one storyboard",
            output.text,
        )
        .into());
    }

    // Ordinals are positional, never taken from model output.
    for (i, storyboard) in storyboards.iter_mut().enumerate() {
        storyboard.storyboard_index = (i + 1) as i32;
        if storyboard.clip_id.is_empty() {
            storyboard.clip_id = format!("clip-{}", i + 1);
        }
        if storyboard.panels.is_empty() {
            return Err(JsonParseError::new(
                "storyboard planning",
                format!("storyboard {} has no panels", storyboard.storyboard_index),
                serde_json::to_string(storyboard).unwrap_or_default(),
            )
            .into());
        }
        for (j, panel) in storyboard.panels.iter_mut().enumerate() {
            panel.panel_index = (j + 1) as i32;
        }
    }

    let storyboard_count = storyboards.len();
    let panel_count: usize = storyboards.iter().map(|s| s.panels.len()).sum();
    let step_total = (1 + 2 * storyboard_count + panel_count + 1) as u32;
    let mut step_index = 1u32;

    for i in 0..storyboard_count {
        let patches = direct_storyboard::<CameraPatch>(
            steps,
            prompts,
            locale,
            &storyboards[i],
            prompt_ids::BOARD_CINEMATOGRAPHY,
            "cinematography",
            step_index,
            step_total,
        )
        .await?;
        apply_patches(&mut storyboards[i], patches, "cinematography", |panel, patch| {
            panel.camera = Some(patch.camera);
        })?;
        step_index += 1;
    }

    for i in 0..storyboard_count {
        let patches = direct_storyboard::<ActingPatch>(
            steps,
            prompts,
            locale,
            &storyboards[i],
            prompt_ids::BOARD_ACTING,
            "acting_direction",
            step_index,
            step_total,
        )
        .await?;
        apply_patches(&mut storyboards[i], patches, "acting direction", |panel, patch| {
            panel.acting = Some(patch.acting);
        })?;
        step_index += 1;
    }

    for i in 0..storyboard_count {
        for j in 0..storyboards[i].panels.len() {
            let detail =
                expand_panel(steps, prompts, locale, &storyboards[i], j, step_index, step_total)
                    .await?;
            storyboards[i].panels[j].detail = Some(detail.detail);
            step_index += 1;
        }
    }

    tracing::info!(
        storyboards = storyboard_count,
        panels = panel_count,
        "script→storyboard construction finished"
    );
    Ok(storyboards)
}

/// Metadata for the voice-line extraction step, positioned after every
/// construction step so progress keeps ascending.
pub fn voice_step_metadata(storyboards: &[StoryboardDraft]) -> StepMetadata {
    let panel_count: usize = storyboards.iter().map(|s| s.panels.len()).sum();
    let step_total = (1 + 2 * storyboards.len() + panel_count + 1) as u32;
    StepMetadata::new(
        "voice-lines",
        "Voice line extraction",
        step_total - 1,
        step_total,
    )
}

/// Extract voice lines from the screenplay and match each to a panel.
///
/// Invoked by the task handler (with its retry policy) rather than inside
/// [`run_script_to_storyboard`], because it is the one step worth retrying
/// in isolation.
#[tracing::instrument(skip_all, fields(attempt = meta.step_attempt))]
pub async fn run_voice_analysis(
    steps: &dyn RunStep,
    prompts: &dyn PromptLibrary,
    locale: Locale,
    script_text: &str,
    storyboards: &[StoryboardDraft],
    meta: &StepMetadata,
) -> ClipwrightResult<Vec<VoiceLineDraft>> {
    let mut vars = HashMap::new();
    vars.insert("script_text".to_string(), script_text.to_string());
    vars.insert("panels".to_string(), panels_block(storyboards));
    let prompt = prompts.build(prompt_ids::BOARD_VOICE_LINES, locale, &vars)?;

    let output = steps
        .run_step(meta, &prompt, "extract_voice_lines", DIRECTION_MAX_TOKENS)
        .await?;
    let mut lines: Vec<VoiceLineDraft> =
        parse_step_json("voice line extraction", &output.text).map_err(log_parse_failure)?;

    // Voice-line identity is positional.
    for (i, line) in lines.iter_mut().enumerate() {
        line.line_index = (i + 1) as i32;
    }
    Ok(lines)
}

#[allow(clippy::too_many_arguments)]
async fn direct_storyboard<P>(
    steps: &dyn RunStep,
    prompts: &dyn PromptLibrary,
    locale: Locale,
    storyboard: &StoryboardDraft,
    prompt_id: &str,
    action: &str,
    step_index: u32,
    step_total: u32,
) -> ClipwrightResult<Vec<P>>
where
    P: serde::de::DeserializeOwned,
{
    let meta = StepMetadata::new(
        format!("{}-{}", action, storyboard.storyboard_index),
        format!("{}: {}", action_title(action), storyboard.title),
        step_index,
        step_total,
    );

    let mut vars = HashMap::new();
    vars.insert("storyboard_title".to_string(), storyboard.title.clone());
    vars.insert("panels".to_string(), storyboard_panels_block(storyboard));
    let prompt = prompts.build(prompt_id, locale, &vars)?;

    let output = steps
        .run_step(&meta, &prompt, action, DIRECTION_MAX_TOKENS)
        .await?;
    parse_step_json(
        &format!("{} for storyboard {}", action, storyboard.storyboard_index),
        &output.text,
    )
    .map_err(log_parse_failure)
}

async fn expand_panel(
    steps: &dyn RunStep,
    prompts: &dyn PromptLibrary,
    locale: Locale,
    storyboard: &StoryboardDraft,
    panel_slot: usize,
    step_index: u32,
    step_total: u32,
) -> ClipwrightResult<PanelDetail> {
    let panel = &storyboard.panels[panel_slot];
    let meta = StepMetadata::new(
        format!("detail-{}-{}", storyboard.storyboard_index, panel.panel_index),
        format!("Panel detail {}/{}", storyboard.storyboard_index, panel.panel_index),
        step_index,
        step_total,
    );

    let mut vars = HashMap::new();
    vars.insert("panel_description".to_string(), panel.description.clone());
    vars.insert(
        "camera".to_string(),
        panel.camera.clone().unwrap_or_default(),
    );
    vars.insert(
        "acting".to_string(),
        panel.acting.clone().unwrap_or_default(),
    );
    let prompt = prompts.build(prompt_ids::BOARD_DETAIL, locale, &vars)?;

    let output = steps
        .run_step(&meta, &prompt, "expand_panel_detail", DETAIL_MAX_TOKENS)
        .await?;
    parse_step_json(
        &format!(
            "detail for panel {}/{}",
            storyboard.storyboard_index, panel.panel_index
        ),
        &output.text,
    )
    .map_err(log_parse_failure)
}

fn apply_patches<P>(
    storyboard: &mut StoryboardDraft,
    patches: Vec<P>,
    context: &str,
    mut apply: impl FnMut(&mut PanelDraft, P),
) -> ClipwrightResult<()>
where
    P: PanelPatch,
{
    for patch in patches {
        let index = patch.panel_index();
        let Some(panel) = storyboard
            .panels
            .iter_mut()
            .find(|panel| panel.panel_index == index)
        else {
            return Err(JsonParseError::new(
                context,
                format!(
                    "patch references missing panel {} in storyboard {}",
                    index, storyboard.storyboard_index
                ),
                String::new(),
            )
            .into());
        };
        apply(panel, patch);
    }
    Ok(())
}

trait PanelPatch {
    fn panel_index(&self) -> i32;
}

impl PanelPatch for CameraPatch {
    fn panel_index(&self) -> i32 {
        self.panel_index
    }
}

impl PanelPatch for ActingPatch {
    fn panel_index(&self) -> i32 {
        self.panel_index
    }
}

fn action_title(action: &str) -> &'static str {
    match action {
        "cinematography" => "Cinematography",
        "acting_direction" => "Acting direction",
        _ => "Direction",
    }
}

/// Panel overview for one storyboard's direction prompts.
fn storyboard_panels_block(storyboard: &StoryboardDraft) -> String {
    storyboard
        .panels
        .iter()
        .map(|p| format!("panel {}: {}", p.panel_index, p.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Panel overview across all storyboards for voice-line matching.
fn panels_block(storyboards: &[StoryboardDraft]) -> String {
    let mut lines = Vec::new();
    for storyboard in storyboards {
        for panel in &storyboard.panels {
            lines.push(format!(
                "storyboard {} panel {}: {}",
                storyboard.storyboard_index, panel.panel_index, panel.description
            ));
        }
    }
    lines.join("\n")
}
