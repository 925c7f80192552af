//! Script→storyboard workflow artifacts.

use serde::{Deserialize, Serialize};

/// Reference to a panel by position, resolvable before database ids exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelRef {
    /// One-based storyboard ordinal within the episode
    pub storyboard_index: i32,
    /// One-based panel ordinal within the storyboard
    pub panel_index: i32,
}

/// One storyboard panel, filled in by successive workflow steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelDraft {
    /// One-based position within the storyboard; assigned from array order
    #[serde(default)]
    pub panel_index: i32,
    /// What the panel depicts
    pub description: String,
    /// Camera direction, filled by the cinematography step
    #[serde(default)]
    pub camera: Option<String>,
    /// Acting direction, filled by the acting step
    #[serde(default)]
    pub acting: Option<String>,
    /// Expanded visual detail, filled by the detail step
    #[serde(default)]
    pub detail: Option<String>,
}

/// One storyboard unit covering a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryboardDraft {
    /// The clip this storyboard covers
    #[serde(default)]
    pub clip_id: String,
    /// One-based position within the episode; assigned from array order
    #[serde(default)]
    pub storyboard_index: i32,
    /// Storyboard title
    #[serde(default)]
    pub title: String,
    /// Ordered panels
    #[serde(default)]
    pub panels: Vec<PanelDraft>,
}

/// One extracted voice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceLineDraft {
    /// One-based position within the episode; voice-line identity is
    /// positional, which is why persistence is full-replace
    #[serde(default)]
    pub line_index: i32,
    /// Speaking character
    pub speaker: String,
    /// Spoken text
    pub text: String,
    /// The panel this line plays over, when one was matched
    #[serde(default)]
    pub matched_panel: Option<PanelRef>,
}

/// Aggregate counts, re-derived from the final artifact lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryboardSummary {
    /// Number of storyboards planned
    pub storyboard_count: usize,
    /// Total panels across all storyboards
    pub panel_count: usize,
    /// Voice lines extracted
    pub voice_line_count: usize,
    /// Total steps the workflow ran
    pub total_step_count: usize,
}

/// Complete output of the script→storyboard workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptToStoryboardResult {
    /// Planned storyboards with fully expanded panels
    pub storyboards: Vec<StoryboardDraft>,
    /// Extracted voice lines with panel matches
    pub voice_lines: Vec<VoiceLineDraft>,
    /// Derived counts
    pub summary: StoryboardSummary,
}

impl ScriptToStoryboardResult {
    /// Assemble the result, deriving the summary from the final lists.
    ///
    /// Step accounting: one planning step, cinematography and acting per
    /// storyboard, detail per panel, one voice-line step.
    pub fn new(storyboards: Vec<StoryboardDraft>, voice_lines: Vec<VoiceLineDraft>) -> Self {
        let storyboard_count = storyboards.len();
        let panel_count = storyboards.iter().map(|s| s.panels.len()).sum::<usize>();
        let voice_line_count = voice_lines.len();
        let summary = StoryboardSummary {
            storyboard_count,
            panel_count,
            voice_line_count,
            total_step_count: 1 + 2 * storyboard_count + panel_count + 1,
        };
        Self {
            storyboards,
            voice_lines,
            summary,
        }
    }
}
