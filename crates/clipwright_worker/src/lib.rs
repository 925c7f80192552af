//! Task handlers and worker pool for clipwright.
//!
//! This crate is the only layer that touches persistence stores and queue
//! primitives. Handlers validate the job, resolve the analysis model, bind
//! a step runner, drive the orchestrator, gate on partial failures, and
//! persist atomically. The worker pool claims whole jobs from the queue
//! and runs each to a terminal outcome.

mod audit;
mod context;
mod handlers;
mod phase;
mod queue;
mod resolve;
mod settings;
mod worker;

pub use audit::{AuditRecord, MemoryAuditLog, TracingAuditLog};
pub use context::{HandlerContext, HandlerContextBuilder};
pub use handlers::{
    ScriptToStoryboardTaskResult, StoryToScriptTaskResult, handle_script_to_storyboard_task,
    handle_story_to_script_task,
};
pub use phase::TaskPhase;
pub use queue::{InMemoryJobQueue, JobStatus, LoggingQueueEvents, QueueEvents};
pub use resolve::resolve_analysis_model;
pub use settings::WorkerSettings;
pub use worker::WorkerPool;
