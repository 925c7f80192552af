//! Worker process configuration.

use clipwright_error::{ClipwrightResult, ConfigError};
use serde::Deserialize;

fn default_worker_count() -> usize {
    2
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_statement_timeout_ms() -> u32 {
    15_000
}

/// Settings for a worker process.
///
/// Loaded from an optional `clipwright.toml` in the working directory with
/// `CLIPWRIGHT_*` environment variables layered on top.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
pub struct WorkerSettings {
    /// Size of the fixed worker pool
    #[serde(default = "default_worker_count")]
    worker_count: usize,
    /// How long an idle worker sleeps before polling the queue again
    #[serde(default = "default_poll_interval_ms")]
    poll_interval_ms: u64,
    /// Bound on how long a persistence transaction may run
    #[serde(default = "default_statement_timeout_ms")]
    statement_timeout_ms: u32,
    /// Database connection string; `DATABASE_URL` wins when unset
    #[serde(default)]
    database_url: Option<String>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            poll_interval_ms: default_poll_interval_ms(),
            statement_timeout_ms: default_statement_timeout_ms(),
            database_url: None,
        }
    }
}

impl WorkerSettings {
    /// Load settings from `clipwright.toml` (optional) and the
    /// `CLIPWRIGHT_` environment prefix.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a source exists but cannot be
    /// parsed into the expected shape.
    pub fn load() -> ClipwrightResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("clipwright").required(false))
            .add_source(config::Environment::with_prefix("CLIPWRIGHT"))
            .build()
            .map_err(|e| ConfigError::new(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| ConfigError::new(e.to_string()).into())
    }
}
