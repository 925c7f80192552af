//! Trait definitions and workflow result types for the clipwright core.
//!
//! This crate defines the seams between the orchestration core and its
//! external collaborators: the LLM completion driver, the task-queue
//! progress/liveness channel, the audit log, prompt templates, model
//! configuration, and the persistence stores. It also owns the structured
//! artifact types the workflow orchestrators emit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;
pub mod workflow;

pub use traits::{
    AuditLog, CompletionDriver, EpisodeStore, JobQueue, ModelConfigSource, ProjectStore,
    PromptLibrary, ScriptGenerationStore, StoryboardGenerationStore, TaskChannel,
};
pub use types::{
    AuditKind, EpisodeRecord, GenerationOptions, GenerationOptionsQuery, ModelType,
    ProgressMeta, ProjectModelConfig, ProjectRecord, ScriptPersistReport,
    StoryboardPersistReport,
};
