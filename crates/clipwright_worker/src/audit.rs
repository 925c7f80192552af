//! Audit log implementations.

use async_trait::async_trait;
use clipwright_core::TaskJob;
use clipwright_interface::{AuditKind, AuditLog};
use tokio::sync::Mutex;

/// Audit log that emits full-text records as tracing events.
///
/// Bodies are deliberately untruncated; postmortems of malformed
/// generations depend on seeing exactly what went over the wire.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditLog;

impl TracingAuditLog {
    /// Create the tracing-backed audit log.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record(&self, job: &TaskJob, step_id: &str, kind: AuditKind, body: &str) {
        tracing::info!(
            target: "clipwright::audit",
            task_id = %job.task_id(),
            task_type = %job.task_type(),
            step = %step_id,
            kind = %kind,
            body = %body,
            "generation audit"
        );
    }
}

/// One captured audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    /// Step the record belongs to (with attempt suffix on retries)
    pub step_id: String,
    /// Prompt or response
    pub kind: AuditKind,
    /// Full body text
    pub body: String,
}

/// Audit log that keeps records in memory for assertions.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl MemoryAuditLog {
    /// Create an empty audit log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured records in arrival order.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, _job: &TaskJob, step_id: &str, kind: AuditKind, body: &str) {
        self.records.lock().await.push(AuditRecord {
            step_id: step_id.to_string(),
            kind,
            body: body.to_string(),
        });
    }
}
