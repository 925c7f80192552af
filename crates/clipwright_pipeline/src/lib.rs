//! Workflow orchestration engine for clipwright.
//!
//! This crate drives the multi-step LLM generation workflows. The
//! [`StepRunner`] executes one LLM-backed step (liveness gate, audit,
//! progress, one completion call); the orchestrator functions
//! ([`run_story_to_script`], [`run_script_to_storyboard`]) sequence steps
//! and assemble structured results. Orchestrators are pure sequencing
//! logic: they receive `run_step` as an injected capability and know
//! nothing about persistence, queues, or model selection.

mod extraction;
mod prompts;
mod script_to_storyboard;
mod step_runner;
mod story_to_script;

pub use extraction::{extract_json, parse_step_json};
pub use prompts::{StaticPromptLibrary, prompt_ids};
pub use script_to_storyboard::{
    ScriptToStoryboardInput, run_script_to_storyboard, run_voice_analysis, voice_step_metadata,
};
pub use step_runner::{RunStep, STEP_BAND_END, STEP_BAND_START, StepRunner, step_percent};
pub use story_to_script::{StoryToScriptInput, run_story_to_script};
