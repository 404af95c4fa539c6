//! Ceremony data model.
//!
//! [`UnlockRequest`] is the ceremony instance. Its stage, status and
//! results are private and only change through the transition function in
//! [`crate::state_machine`]; callers receive clones as snapshots.

use crate::errors::UnlockError;
use acey_core::effects::IntegrityCheck;
use acey_core::CeremonyId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted reason, in characters after trimming.
pub const MAX_REASON_CHARS: usize = 1024;

// =============================================================================
// STAGES AND STATUS
// =============================================================================

/// Position of a ceremony in the state machine.
///
/// Forward order: `BiometricPending` → `TimeDelayPending` →
/// `DesktopConfirmationPending` → `IntegrityCheckPending` →
/// `RehydrationPending` → `Completed`. `Failed` and `Cancelled` are reachable
/// from every non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CeremonyStage {
    /// Waiting for the biometric authenticator
    BiometricPending,
    /// Mandatory countdown after biometric success
    TimeDelayPending,
    /// Waiting for the out-of-band desktop approval
    DesktopConfirmationPending,
    /// Waiting for the integrity battery
    IntegrityCheckPending,
    /// Bounded wait while functionality is restored
    RehydrationPending,
    /// Terminal success
    Completed,
    /// Terminal failure
    Failed,
    /// Terminal cancellation
    Cancelled,
}

impl CeremonyStage {
    /// Forward progression, initial stage first.
    pub const PROGRESSION: [CeremonyStage; 6] = [
        CeremonyStage::BiometricPending,
        CeremonyStage::TimeDelayPending,
        CeremonyStage::DesktopConfirmationPending,
        CeremonyStage::IntegrityCheckPending,
        CeremonyStage::RehydrationPending,
        CeremonyStage::Completed,
    ];

    /// Rank used for the monotonic-progression invariant. Failure and
    /// cancellation rank above every other stage.
    pub fn ordinal(&self) -> u8 {
        match self {
            CeremonyStage::BiometricPending => 0,
            CeremonyStage::TimeDelayPending => 1,
            CeremonyStage::DesktopConfirmationPending => 2,
            CeremonyStage::IntegrityCheckPending => 3,
            CeremonyStage::RehydrationPending => 4,
            CeremonyStage::Completed => 5,
            CeremonyStage::Failed | CeremonyStage::Cancelled => 6,
        }
    }

    /// Coarse status for this stage.
    pub fn status(&self) -> CeremonyStatus {
        match self {
            CeremonyStage::Completed => CeremonyStatus::Completed,
            CeremonyStage::Failed => CeremonyStatus::Failed,
            CeremonyStage::Cancelled => CeremonyStatus::Cancelled,
            _ => CeremonyStatus::Pending,
        }
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    /// Whether the stage ends on a scheduled wake rather than a capability
    /// callback.
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            CeremonyStage::TimeDelayPending | CeremonyStage::RehydrationPending
        )
    }

    /// Snake-case name used in audit keys and log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            CeremonyStage::BiometricPending => "biometric_pending",
            CeremonyStage::TimeDelayPending => "time_delay_pending",
            CeremonyStage::DesktopConfirmationPending => "desktop_confirmation_pending",
            CeremonyStage::IntegrityCheckPending => "integrity_check_pending",
            CeremonyStage::RehydrationPending => "rehydration_pending",
            CeremonyStage::Completed => "completed",
            CeremonyStage::Failed => "failed",
            CeremonyStage::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for CeremonyStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse-grained outcome classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CeremonyStatus {
    /// Any non-terminal stage
    Pending,
    /// Ceremony succeeded
    Completed,
    /// Ceremony failed or expired
    Failed,
    /// Ceremony was cancelled by the caller
    Cancelled,
}

impl CeremonyStatus {
    /// Whether this status is final.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, CeremonyStatus::Pending)
    }
}

impl fmt::Display for CeremonyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CeremonyStatus::Pending => "Pending",
            CeremonyStatus::Completed => "Completed",
            CeremonyStatus::Failed => "Failed",
            CeremonyStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Why a ceremony ended in `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CeremonyFailure {
    /// The authenticator rejected the user
    BiometricRejected {
        /// Explanation from the authenticator, if any
        reason: Option<String>,
    },
    /// The desktop peer explicitly denied the unlock
    DesktopDenied,
    /// At least one integrity check failed
    IntegrityCheckFailed {
        /// Names of every failing check
        failed: Vec<String>,
    },
    /// The scanner reported no checks at all
    NoIntegrityChecks,
    /// A capability returned an error instead of a verdict
    CapabilityUnavailable {
        /// Stage whose capability failed
        stage: CeremonyStage,
        /// Error reported by the capability
        reason: String,
    },
    /// The ceremony window closed while still pending
    Expired {
        /// Deadline that was passed
        expires_at_ms: u64,
        /// Stage the ceremony was in when it expired
        stage: CeremonyStage,
    },
}

impl CeremonyFailure {
    /// Short machine-readable marker; `"expired"` identifies timeouts.
    pub fn marker(&self) -> &'static str {
        match self {
            CeremonyFailure::BiometricRejected { .. } => "biometric_rejected",
            CeremonyFailure::DesktopDenied => "desktop_denied",
            CeremonyFailure::IntegrityCheckFailed { .. } => "integrity_check_failed",
            CeremonyFailure::NoIntegrityChecks => "no_integrity_checks",
            CeremonyFailure::CapabilityUnavailable { .. } => "capability_unavailable",
            CeremonyFailure::Expired { .. } => "expired",
        }
    }

    /// Whether the failure was a timeout rather than an active rejection.
    pub fn is_expired(&self) -> bool {
        matches!(self, CeremonyFailure::Expired { .. })
    }
}

impl fmt::Display for CeremonyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CeremonyFailure::BiometricRejected { reason: Some(r) } => {
                write!(f, "biometric authentication rejected: {r}")
            }
            CeremonyFailure::BiometricRejected { reason: None } => {
                write!(f, "biometric authentication rejected")
            }
            CeremonyFailure::DesktopDenied => write!(f, "desktop confirmation denied"),
            CeremonyFailure::IntegrityCheckFailed { failed } => {
                write!(f, "integrity checks failed: {}", failed.join(", "))
            }
            CeremonyFailure::NoIntegrityChecks => {
                write!(f, "integrity scanner reported no checks")
            }
            CeremonyFailure::CapabilityUnavailable { stage, reason } => {
                write!(f, "capability unavailable during {stage}: {reason}")
            }
            CeremonyFailure::Expired {
                expires_at_ms,
                stage,
            } => write!(f, "expired during {stage} (deadline {expires_at_ms}ms)"),
        }
    }
}

/// Structured payload attached on the integrity stage and on failure.
///
/// Each part is written at most once and never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeremonyResults {
    integrity_checks: Option<Vec<IntegrityCheck>>,
    failure: Option<CeremonyFailure>,
}

impl CeremonyResults {
    /// Every check reported by the integrity scanner, if the stage ran.
    pub fn integrity_checks(&self) -> Option<&[IntegrityCheck]> {
        self.integrity_checks.as_deref()
    }

    /// Failure marker, if the ceremony failed.
    pub fn failure(&self) -> Option<&CeremonyFailure> {
        self.failure.as_ref()
    }

    /// Whether the ceremony failed by timing out.
    pub fn is_expired(&self) -> bool {
        self.failure.as_ref().is_some_and(CeremonyFailure::is_expired)
    }

    /// Checks that reported `passed = false`.
    pub fn failed_checks(&self) -> Vec<&IntegrityCheck> {
        self.integrity_checks
            .iter()
            .flatten()
            .filter(|c| !c.passed)
            .collect()
    }

    /// Human-readable one-paragraph summary.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(failure) = &self.failure {
            parts.push(failure.to_string());
        }
        if let Some(checks) = &self.integrity_checks {
            let passed = checks.iter().filter(|c| c.passed).count();
            parts.push(format!("{passed} of {} integrity checks passed", checks.len()));
            for check in checks.iter().filter(|c| !c.passed) {
                parts.push(format!("{}: {}", check.name, check.details));
            }
        }
        if parts.is_empty() {
            "no results".to_string()
        } else {
            parts.join("; ")
        }
    }

    fn set_integrity_checks(&mut self, checks: Vec<IntegrityCheck>) -> bool {
        if self.integrity_checks.is_some() {
            return false;
        }
        self.integrity_checks = Some(checks);
        true
    }

    fn set_failure(&mut self, failure: CeremonyFailure) -> bool {
        if self.failure.is_some() {
            return false;
        }
        self.failure = Some(failure);
        true
    }
}

// =============================================================================
// UNLOCK REQUEST
// =============================================================================

/// One unlock ceremony instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRequest {
    id: CeremonyId,
    reason: String,
    stage: CeremonyStage,
    status: CeremonyStatus,
    created_at_ms: u64,
    expires_at_ms: u64,
    stage_entered_at_ms: u64,
    next_wake_at_ms: Option<u64>,
    results: Option<CeremonyResults>,
}

impl UnlockRequest {
    /// Create a request in `BiometricPending`.
    ///
    /// The reason is trimmed and must be non-empty. `expires_at_ms` is fixed
    /// here to `created_at_ms + ceremony_timeout_ms` and never changes.
    pub fn new(
        id: CeremonyId,
        reason: &str,
        created_at_ms: u64,
        ceremony_timeout_ms: u64,
    ) -> Result<Self, UnlockError> {
        let reason = validate_reason(reason)?;
        Ok(Self {
            id,
            reason,
            stage: CeremonyStage::BiometricPending,
            status: CeremonyStatus::Pending,
            created_at_ms,
            expires_at_ms: created_at_ms.saturating_add(ceremony_timeout_ms),
            stage_entered_at_ms: created_at_ms,
            next_wake_at_ms: None,
            results: None,
        })
    }

    /// Ceremony identifier
    pub fn id(&self) -> CeremonyId {
        self.id
    }

    /// Reason supplied by the initiating owner
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Current stage
    pub fn stage(&self) -> CeremonyStage {
        self.stage
    }

    /// Current status
    pub fn status(&self) -> CeremonyStatus {
        self.status
    }

    /// Creation time
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Hard deadline
    pub fn expires_at_ms(&self) -> u64 {
        self.expires_at_ms
    }

    /// When the current stage was entered
    pub fn stage_entered_at_ms(&self) -> u64 {
        self.stage_entered_at_ms
    }

    /// Scheduled wake for timed stages
    pub fn next_wake_at_ms(&self) -> Option<u64> {
        self.next_wake_at_ms
    }

    /// Attached results, if any
    pub fn results(&self) -> Option<&CeremonyResults> {
        self.results.as_ref()
    }

    /// Failure marker, if the ceremony failed
    pub fn failure(&self) -> Option<&CeremonyFailure> {
        self.results.as_ref().and_then(CeremonyResults::failure)
    }

    /// Whether the ceremony is still pending
    pub fn is_pending(&self) -> bool {
        self.status == CeremonyStatus::Pending
    }

    /// Whether the ceremony reached a terminal status
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether the deadline has passed at `now_ms`.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at_ms
    }

    /// Milliseconds left before the deadline.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.expires_at_ms.saturating_sub(now_ms)
    }

    pub(crate) fn enter_stage(&mut self, to: CeremonyStage, now_ms: u64, wake_at_ms: Option<u64>) {
        debug_assert!(to.ordinal() > self.stage.ordinal());
        debug_assert!(!to.is_terminal());
        self.stage = to;
        self.status = to.status();
        self.stage_entered_at_ms = now_ms;
        self.next_wake_at_ms = wake_at_ms;
    }

    pub(crate) fn terminate(
        &mut self,
        to: CeremonyStage,
        now_ms: u64,
        failure: Option<CeremonyFailure>,
    ) {
        debug_assert!(to.is_terminal());
        debug_assert!(!self.stage.is_terminal());
        self.stage = to;
        self.status = to.status();
        self.stage_entered_at_ms = now_ms;
        self.next_wake_at_ms = None;
        if let Some(failure) = failure {
            self.results.get_or_insert_with(Default::default).set_failure(failure);
        }
    }

    pub(crate) fn record_integrity_checks(&mut self, checks: Vec<IntegrityCheck>) {
        self.results
            .get_or_insert_with(Default::default)
            .set_integrity_checks(checks);
    }
}

/// Trim and validate a caller-supplied reason.
pub fn validate_reason(reason: &str) -> Result<String, UnlockError> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err(UnlockError::invalid_reason("reason must not be empty"));
    }
    if trimmed.chars().count() > MAX_REASON_CHARS {
        return Err(UnlockError::invalid_reason(format!(
            "reason exceeds {MAX_REASON_CHARS} characters"
        )));
    }
    Ok(trimmed.to_string())
}
