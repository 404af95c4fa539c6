//! In-memory audit sink.

use acey_core::effects::{AuditEffects, AuditRecord};
use acey_core::{AceyError, AceyResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keeps every appended record; can be switched to reject appends.
#[derive(Debug, Default)]
pub struct RecordingAudit {
    records: Mutex<Vec<AuditRecord>>,
    failing: AtomicBool,
}

impl RecordingAudit {
    /// Empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, in append order
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Record kinds, in append order
    pub fn kinds(&self) -> Vec<String> {
        self.records.lock().iter().map(|r| r.kind.clone()).collect()
    }

    /// Records of one kind
    pub fn of_kind(&self, kind: &str) -> Vec<AuditRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    /// Make subsequent appends fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl AuditEffects for RecordingAudit {
    async fn append_audit_record(&self, record: AuditRecord) -> AceyResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AceyError::unavailable("audit sink offline"));
        }
        self.records.lock().push(record);
        Ok(())
    }
}
