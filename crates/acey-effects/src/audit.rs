//! Audit sink that forwards records to `tracing`.

use acey_core::effects::{AuditEffects, AuditRecord};
use acey_core::AceyResult;
use async_trait::async_trait;

/// Emits every audit record as a structured `tracing` event on the
/// `acey::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditHandler;

impl TracingAuditHandler {
    /// Create a new tracing audit handler
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditEffects for TracingAuditHandler {
    async fn append_audit_record(&self, record: AuditRecord) -> AceyResult<()> {
        tracing::info!(
            target: "acey::audit",
            key = %record.key,
            kind = %record.kind,
            timestamp_ms = record.timestamp_ms,
            payload = %record.payload_text(),
            "audit record"
        );
        Ok(())
    }
}
