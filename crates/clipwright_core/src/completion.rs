//! Request and response types for LLM completions.

use crate::Message;
use serde::{Deserialize, Serialize};

/// Reasoning effort requested from models that support it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal reasoning budget
    #[display("low")]
    Low,
    /// Default reasoning budget
    #[display("medium")]
    Medium,
    /// Extended reasoning budget
    #[display("high")]
    High,
}

/// A completion request.
///
/// # Examples
///
/// ```
/// use clipwright_core::{CompletionRequest, Message};
///
/// let request = CompletionRequest::builder()
///     .messages(vec![Message::user("Hello!")])
///     .max_output_tokens(Some(256))
///     .model(Some("deepseek-chat".to_string()))
///     .build()
///     .unwrap();
///
/// assert_eq!(request.messages.len(), 1);
/// assert_eq!(request.max_output_tokens, Some(256));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default, derive_builder::Builder)]
#[builder(default)]
pub struct CompletionRequest {
    /// The conversation messages to send
    pub messages: Vec<Message>,
    /// Model identifier to use
    pub model: Option<String>,
    /// Maximum number of tokens to generate
    pub max_output_tokens: Option<u32>,
    /// Sampling temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Reasoning effort for capability-selected models
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl CompletionRequest {
    /// Start building a request.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }
}

/// The unified completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub text: String,
    /// Separated reasoning trace, if the model produced one
    pub reasoning: Option<String>,
    /// Model that actually served the request
    pub model: Option<String>,
}

impl Completion {
    /// Create a completion with text only.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reasoning: None,
            model: None,
        }
    }

    /// Split the completion into its text and reasoning parts.
    ///
    /// The text is the step's structured payload; reasoning is an
    /// audit artifact only.
    pub fn parts(&self) -> CompletionParts {
        CompletionParts {
            text: self.text.clone(),
            reasoning: self.reasoning.clone(),
        }
    }
}

/// Text and reasoning extracted from a completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParts {
    /// Raw model text
    pub text: String,
    /// Separated reasoning trace
    pub reasoning: Option<String>,
}
