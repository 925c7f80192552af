//! Story→script workflow artifacts.

use serde::{Deserialize, Serialize};

/// A character extracted from the novel text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterProfile {
    /// Character name
    pub name: String,
    /// Narrative role (protagonist, antagonist, supporting, ...)
    #[serde(default)]
    pub role: String,
    /// Physical appearance notes for downstream image generation
    #[serde(default)]
    pub appearance: String,
    /// Personality notes for acting direction
    #[serde(default)]
    pub personality: String,
}

/// A location selected from the novel text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationProfile {
    /// Location name
    pub name: String,
    /// Visual description
    #[serde(default)]
    pub description: String,
    /// Optional mood/atmosphere note
    #[serde(default)]
    pub mood: Option<String>,
}

/// One clip produced by segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDraft {
    /// One-based position within the episode; assigned by the orchestrator
    /// from array order, never taken from model output
    #[serde(default)]
    pub clip_index: u32,
    /// Clip title
    pub title: String,
    /// Short synopsis of the clip
    #[serde(default)]
    pub summary: String,
    /// The novel excerpt this clip covers
    #[serde(default)]
    pub source_excerpt: String,
}

impl ClipDraft {
    /// Position-derived clip identity used in outcomes and persistence.
    pub fn clip_id(&self) -> String {
        format!("clip-{}", self.clip_index)
    }
}

/// One screenplay line: dialogue when `speaker` is set, action otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenplayLine {
    /// Speaking character, absent for action lines
    #[serde(default)]
    pub speaker: Option<String>,
    /// Line text
    pub text: String,
}

/// The screenplay generated for one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipScreenplay {
    /// Scene heading (INT/EXT, location, time)
    #[serde(default)]
    pub scene_heading: String,
    /// Ordered screenplay lines
    #[serde(default)]
    pub lines: Vec<ScreenplayLine>,
}

/// Per-clip screenplay outcome: success and failure are both data, and the
/// two payload fields are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipScreenplayOutcome {
    /// Position-derived clip id
    pub clip_id: String,
    /// Whether conversion succeeded
    pub success: bool,
    /// The screenplay, present iff `success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenplay: Option<ClipScreenplay>,
    /// The failure reason, present iff `!success`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ClipScreenplayOutcome {
    /// A successful conversion.
    pub fn ok(clip_id: impl Into<String>, screenplay: ClipScreenplay) -> Self {
        Self {
            clip_id: clip_id.into(),
            success: true,
            screenplay: Some(screenplay),
            error: None,
        }
    }

    /// A failed conversion, captured as data.
    pub fn failed(clip_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            clip_id: clip_id.into(),
            success: false,
            screenplay: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate counts, always re-derived from the per-clip records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryToScriptSummary {
    /// Number of clips segmentation produced
    pub clip_count: usize,
    /// Clips whose screenplay conversion succeeded
    pub screenplay_success_count: usize,
    /// Clips whose screenplay conversion failed
    pub screenplay_failed_count: usize,
    /// Total steps the workflow ran
    pub total_step_count: usize,
}

/// Complete output of the story→script orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryToScriptResult {
    /// Extracted character profiles
    pub characters: Vec<CharacterProfile>,
    /// Selected locations
    pub locations: Vec<LocationProfile>,
    /// Segmented clips
    pub clips: Vec<ClipDraft>,
    /// Per-clip screenplay outcomes, one per clip, in clip order
    pub screenplays: Vec<ClipScreenplayOutcome>,
    /// Derived counts
    pub summary: StoryToScriptSummary,
}

impl StoryToScriptResult {
    /// Assemble the result, deriving the summary from the final records.
    ///
    /// Counts are computed here rather than accumulated during iteration so
    /// a retried clip cannot skew them.
    pub fn new(
        characters: Vec<CharacterProfile>,
        locations: Vec<LocationProfile>,
        clips: Vec<ClipDraft>,
        screenplays: Vec<ClipScreenplayOutcome>,
    ) -> Self {
        let clip_count = clips.len();
        let screenplay_success_count = screenplays.iter().filter(|o| o.success).count();
        let screenplay_failed_count = screenplays.iter().filter(|o| !o.success).count();
        let summary = StoryToScriptSummary {
            clip_count,
            screenplay_success_count,
            screenplay_failed_count,
            total_step_count: 3 + clip_count,
        };
        Self {
            characters,
            locations,
            clips,
            screenplays,
            summary,
        }
    }

    /// The failed outcomes, in clip order.
    pub fn failed_screenplays(&self) -> Vec<&ClipScreenplayOutcome> {
        self.screenplays.iter().filter(|o| !o.success).collect()
    }

    /// Render the successful screenplays into one plain-text script.
    ///
    /// Deterministic: a pure function of the outcome list, used by the
    /// persistence layer to refresh the episode's script text.
    pub fn render_script_text(&self) -> String {
        let mut sections = Vec::new();
        for outcome in &self.screenplays {
            let Some(screenplay) = &outcome.screenplay else {
                continue;
            };
            let mut section = String::new();
            section.push_str(&screenplay.scene_heading);
            for line in &screenplay.lines {
                section.push('\n');
                match &line.speaker {
                    Some(speaker) => {
                        section.push_str(speaker);
                        section.push_str(": ");
                    }
                    None => section.push_str("  "),
                }
                section.push_str(&line.text);
            }
            sections.push(section);
        }
        sections.join("\n\n")
    }
}
