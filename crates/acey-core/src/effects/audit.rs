//! Audit trail effects.
//!
//! Durable audit storage is an external collaborator. Producers hand it
//! keyed, timestamped records whose payload is already serialized.

use crate::AceyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One entry in the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Unique key, e.g. `unlock:started:<id>`
    pub key: String,
    /// Short record kind used for filtering
    pub kind: String,
    /// Serialized payload (JSON)
    pub payload: Vec<u8>,
    /// Time the record was produced
    pub timestamp_ms: u64,
}

impl AuditRecord {
    /// Payload as UTF-8 text, lossy.
    pub fn payload_text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Audit sink interface.
#[async_trait]
pub trait AuditEffects: Send + Sync {
    /// Append a record to the audit trail.
    async fn append_audit_record(&self, record: AuditRecord) -> AceyResult<()>;
}

#[async_trait]
impl<T: AuditEffects + ?Sized> AuditEffects for std::sync::Arc<T> {
    async fn append_audit_record(&self, record: AuditRecord) -> AceyResult<()> {
        (**self).append_audit_record(record).await
    }
}
