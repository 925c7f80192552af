//! PostgreSQL persistence for clipwright.
//!
//! This crate implements the generation store contracts on top of Diesel:
//! multi-row, referentially consistent writes inside a bounded-timeout
//! transaction, with delete-then-recreate (full-replace) semantics for
//! derived rows. A memory-backed twin mirrors the same contract for tests
//! and local runs without a database.

mod connection;
mod generation_store;
mod memory;
mod models;
pub mod schema;
mod validate;

pub use connection::establish_connection;
pub use generation_store::PostgresGenerationStore;
pub use memory::{MemoryGenerationStore, PersistedVoiceLine};
pub use models::{
    CharacterRow, ClipRow, EpisodeRow, LocationRow, NewCharacterRow, NewClipRow,
    NewLocationRow, NewPanelRow, NewStoryboardRow, NewVoiceLineRow, PanelRow, ProjectRow,
    StoryboardRow, VoiceLineRow,
};

use clipwright_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
