//! Step identity and output types.

use serde::{Deserialize, Serialize};

/// Identity and position of one LLM-backed step within a workflow.
///
/// `step_index`/`step_total` drive progress math; `step_attempt` identifies
/// retries without disturbing the step's ordinal position.
///
/// # Examples
///
/// ```
/// use clipwright_core::StepMetadata;
///
/// let meta = StepMetadata::new("voice-lines", "Voice line extraction", 12, 14);
/// let retry = meta.with_attempt(2);
/// assert_eq!(retry.step_id, "voice-lines#attempt-2");
/// assert_eq!(retry.step_index, meta.step_index);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepMetadata {
    /// Stable step identifier; retried attempts gain an `#attempt-N` suffix
    pub step_id: String,
    /// Human-readable step title for progress display
    pub step_title: String,
    /// Zero-based ordinal of this step within the workflow
    pub step_index: u32,
    /// Total number of steps the workflow will run
    pub step_total: u32,
    /// Attempt number, starting at 1
    pub step_attempt: u32,
}

impl StepMetadata {
    /// Create metadata for a first attempt.
    pub fn new(
        step_id: impl Into<String>,
        step_title: impl Into<String>,
        step_index: u32,
        step_total: u32,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            step_title: step_title.into(),
            step_index,
            step_total,
            step_attempt: 1,
        }
    }

    /// Derive metadata for attempt `n` of the same step.
    ///
    /// The ordinal position is unchanged; only the id gains a suffix so
    /// audit records distinguish attempts. Call on the base metadata, not
    /// on an already-suffixed one.
    pub fn with_attempt(&self, n: u32) -> Self {
        let step_id = if n <= 1 {
            self.step_id.clone()
        } else {
            format!("{}#attempt-{}", self.step_id, n)
        };
        Self {
            step_id,
            step_title: self.step_title.clone(),
            step_index: self.step_index,
            step_total: self.step_total,
            step_attempt: n.max(1),
        }
    }
}

/// Raw output of one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    /// Raw model text; the step's structured payload
    pub text: String,
    /// Separated reasoning trace; audit artifact only
    pub reasoning: Option<String>,
}
