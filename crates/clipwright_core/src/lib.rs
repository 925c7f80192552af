//! Core data types for the clipwright orchestration core.
//!
//! This crate provides the foundation data types shared across the
//! clipwright workspace: chat message shapes, completion request/response
//! types, the queued task job envelope, step metadata, and the
//! validated-on-read payload view.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod completion;
mod job;
mod locale;
mod message;
mod payload;
mod role;
mod step;
mod telemetry;

pub use completion::{
    Completion, CompletionParts, CompletionRequest, CompletionRequestBuilder, ReasoningEffort,
};
pub use job::{JobEnvelope, ProjectMode, TaskJob, TaskJobBuilder, TaskType};
pub use locale::Locale;
pub use message::{Message, MessageBuilder};
pub use payload::PayloadView;
pub use role::Role;
pub use step::{StepMetadata, StepOutput};
pub use telemetry::init_telemetry;
