//! Unlock ceremony audit facts
//!
//! Every externally meaningful step of a ceremony produces one
//! [`UnlockCeremonyFact`]. The driver serializes it into an
//! [`AuditRecord`] and hands it to the audit sink; durable storage is the
//! sink's concern.
//!
//! Keys are formatted as `unlock:{sub_type}:{ceremony_id}[:{discriminator}]`.

use crate::event::DiscardReason;
use crate::types::{CeremonyFailure, CeremonyStage, CeremonyStatus};
use acey_core::effects::{AuditRecord, IntegrityCheck};
use acey_core::{AceyError, AceyResult, CeremonyId};
use serde::{Deserialize, Serialize};

/// Type identifier for unlock facts
pub const UNLOCK_FACT_TYPE_ID: &str = "unlock";

/// Unlock ceremony lifecycle facts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum UnlockCeremonyFact {
    /// A ceremony was admitted
    CeremonyStarted {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Reason given by the owner
        reason: String,
        /// Hard deadline (ms since epoch)
        expires_at_ms: u64,
        /// Timestamp (ms since epoch)
        started_at_ms: u64,
    },

    /// A non-terminal stage was entered
    StageEntered {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Stage left
        from: CeremonyStage,
        /// Stage entered
        stage: CeremonyStage,
        /// Scheduled wake for timed stages
        wake_at_ms: Option<u64>,
        /// Timestamp (ms since epoch)
        entered_at_ms: u64,
    },

    /// An event was ignored
    StageResultDiscarded {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Kind of the ignored event
        event_kind: String,
        /// Why it was ignored
        reason: DiscardReason,
        /// Timestamp (ms since epoch)
        discarded_at_ms: u64,
    },

    /// The ceremony completed
    CeremonyCompleted {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Checks that passed on the way
        integrity_checks: Vec<IntegrityCheck>,
        /// Timestamp (ms since epoch)
        completed_at_ms: u64,
    },

    /// The ceremony failed
    CeremonyFailed {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Stage the ceremony failed in
        stage: CeremonyStage,
        /// Failure marker
        failure: CeremonyFailure,
        /// Integrity checks, when the scan ran
        integrity_checks: Option<Vec<IntegrityCheck>>,
        /// Timestamp (ms since epoch)
        failed_at_ms: u64,
    },

    /// The ceremony was cancelled by its owner
    CeremonyCancelled {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Stage the ceremony was cancelled in
        stage: CeremonyStage,
        /// Timestamp (ms since epoch)
        cancelled_at_ms: u64,
    },

    /// The owner acknowledged the outcome and the request was forgotten
    CeremonyAcknowledged {
        /// Ceremony identifier
        ceremony_id: CeremonyId,
        /// Final status
        status: CeremonyStatus,
        /// Timestamp (ms since epoch)
        acknowledged_at_ms: u64,
    },
}

impl UnlockCeremonyFact {
    /// Ceremony this fact belongs to
    pub fn ceremony_id(&self) -> CeremonyId {
        match self {
            UnlockCeremonyFact::CeremonyStarted { ceremony_id, .. }
            | UnlockCeremonyFact::StageEntered { ceremony_id, .. }
            | UnlockCeremonyFact::StageResultDiscarded { ceremony_id, .. }
            | UnlockCeremonyFact::CeremonyCompleted { ceremony_id, .. }
            | UnlockCeremonyFact::CeremonyFailed { ceremony_id, .. }
            | UnlockCeremonyFact::CeremonyCancelled { ceremony_id, .. }
            | UnlockCeremonyFact::CeremonyAcknowledged { ceremony_id, .. } => *ceremony_id,
        }
    }

    /// When the fact was produced
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            UnlockCeremonyFact::CeremonyStarted { started_at_ms, .. } => *started_at_ms,
            UnlockCeremonyFact::StageEntered { entered_at_ms, .. } => *entered_at_ms,
            UnlockCeremonyFact::StageResultDiscarded {
                discarded_at_ms, ..
            } => *discarded_at_ms,
            UnlockCeremonyFact::CeremonyCompleted {
                completed_at_ms, ..
            } => *completed_at_ms,
            UnlockCeremonyFact::CeremonyFailed { failed_at_ms, .. } => *failed_at_ms,
            UnlockCeremonyFact::CeremonyCancelled {
                cancelled_at_ms, ..
            } => *cancelled_at_ms,
            UnlockCeremonyFact::CeremonyAcknowledged {
                acknowledged_at_ms, ..
            } => *acknowledged_at_ms,
        }
    }

    /// Get the sub-type string for this fact variant
    pub fn sub_type(&self) -> &'static str {
        match self {
            UnlockCeremonyFact::CeremonyStarted { .. } => "started",
            UnlockCeremonyFact::StageEntered { .. } => "stage-entered",
            UnlockCeremonyFact::StageResultDiscarded { .. } => "stale-stage-result",
            UnlockCeremonyFact::CeremonyCompleted { .. } => "completed",
            UnlockCeremonyFact::CeremonyFailed { .. } => "failed",
            UnlockCeremonyFact::CeremonyCancelled { .. } => "cancelled",
            UnlockCeremonyFact::CeremonyAcknowledged { .. } => "acknowledged",
        }
    }

    /// Audit key for this fact.
    ///
    /// Terminal and start facts are unique per ceremony. Stage entries are
    /// keyed by stage; discards by event kind and time.
    pub fn key(&self) -> String {
        let base = format!(
            "{}:{}:{}",
            UNLOCK_FACT_TYPE_ID,
            self.sub_type(),
            self.ceremony_id()
        );
        match self {
            UnlockCeremonyFact::StageEntered { stage, .. } => format!("{base}:{stage}"),
            UnlockCeremonyFact::StageResultDiscarded {
                event_kind,
                discarded_at_ms,
                ..
            } => format!("{base}:{event_kind}:{discarded_at_ms}"),
            _ => base,
        }
    }

    /// Serialize to JSON bytes
    pub fn to_bytes(&self) -> AceyResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(AceyError::from)
    }

    /// Deserialize from JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        serde_json::from_slice(bytes).ok()
    }

    /// Wrap as an audit record.
    pub fn to_audit_record(&self) -> AceyResult<AuditRecord> {
        Ok(AuditRecord {
            key: self.key(),
            kind: self.sub_type().to_string(),
            payload: self.to_bytes()?,
            timestamp_ms: self.timestamp_ms(),
        })
    }

    /// Recover a fact from an audit record produced by [`Self::to_audit_record`].
    pub fn from_audit_record(record: &AuditRecord) -> Option<Self> {
        Self::from_bytes(&record.payload)
    }
}
