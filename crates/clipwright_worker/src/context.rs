//! Collaborator bundle handed to task handlers.

use clipwright_interface::{
    AuditLog, CompletionDriver, EpisodeStore, ModelConfigSource, ProjectStore, PromptLibrary,
    ScriptGenerationStore, StoryboardGenerationStore, TaskChannel,
};
use std::sync::Arc;

/// Everything a task handler needs, injected as trait objects so tests can
/// substitute fakes for any collaborator.
#[derive(Clone, derive_builder::Builder)]
pub struct HandlerContext {
    /// LLM completion client
    pub driver: Arc<dyn CompletionDriver>,
    /// Progress and liveness channel
    pub channel: Arc<dyn TaskChannel>,
    /// Full-text prompt/response audit trail
    pub audit: Arc<dyn AuditLog>,
    /// Prompt templates
    pub prompts: Arc<dyn PromptLibrary>,
    /// Model configuration resolution
    pub models: Arc<dyn ModelConfigSource>,
    /// Project reads
    pub projects: Arc<dyn ProjectStore>,
    /// Episode reads
    pub episodes: Arc<dyn EpisodeStore>,
    /// Story→script persistence
    pub scripts: Arc<dyn ScriptGenerationStore>,
    /// Script→storyboard persistence
    pub storyboards: Arc<dyn StoryboardGenerationStore>,
}

impl HandlerContext {
    /// Start building a context.
    pub fn builder() -> HandlerContextBuilder {
        HandlerContextBuilder::default()
    }
}
