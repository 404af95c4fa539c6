//! Inputs to the ceremony state machine.

use crate::types::{CeremonyStage, CeremonyStatus};
use acey_core::effects::IntegrityCheck;
use serde::{Deserialize, Serialize};

/// Everything that can drive a ceremony.
///
/// Capability callbacks, timer wakes, the expiry tick and cancel requests
/// all enter through this one type, so every change to a request goes
/// through [`crate::state_machine::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CeremonyEvent {
    /// The biometric authenticator returned a verdict
    BiometricResult {
        /// Whether the user was accepted
        success: bool,
        /// Optional explanation on rejection
        error: Option<String>,
    },
    /// A scheduled wake for a timed stage fired
    TimerElapsed {
        /// Stage the timer was scheduled for
        stage: CeremonyStage,
    },
    /// The desktop peer answered
    DesktopConfirmed {
        /// Whether the peer approved
        confirmed: bool,
    },
    /// The integrity scanner finished
    IntegrityResults {
        /// Every check it ran
        checks: Vec<IntegrityCheck>,
    },
    /// A capability returned an error instead of a verdict
    CapabilityFailed {
        /// Stage whose capability failed
        stage: CeremonyStage,
        /// Error text
        reason: String,
    },
    /// Periodic deadline check
    ExpiryTick,
    /// The owner asked to abort
    CancelRequested,
}

impl CeremonyEvent {
    /// Short name for logging and audit.
    pub fn kind(&self) -> &'static str {
        match self {
            CeremonyEvent::BiometricResult { .. } => "biometric_result",
            CeremonyEvent::TimerElapsed { .. } => "timer_elapsed",
            CeremonyEvent::DesktopConfirmed { .. } => "desktop_confirmed",
            CeremonyEvent::IntegrityResults { .. } => "integrity_results",
            CeremonyEvent::CapabilityFailed { .. } => "capability_failed",
            CeremonyEvent::ExpiryTick => "expiry_tick",
            CeremonyEvent::CancelRequested => "cancel_requested",
        }
    }

    /// Stage this event is a result for, if it is stage-specific.
    pub fn target_stage(&self) -> Option<CeremonyStage> {
        match self {
            CeremonyEvent::BiometricResult { .. } => Some(CeremonyStage::BiometricPending),
            CeremonyEvent::TimerElapsed { stage } => Some(*stage),
            CeremonyEvent::DesktopConfirmed { .. } => {
                Some(CeremonyStage::DesktopConfirmationPending)
            }
            CeremonyEvent::IntegrityResults { .. } => Some(CeremonyStage::IntegrityCheckPending),
            CeremonyEvent::CapabilityFailed { stage, .. } => Some(*stage),
            CeremonyEvent::ExpiryTick | CeremonyEvent::CancelRequested => None,
        }
    }

    /// Biometric acceptance.
    pub fn biometric_accepted() -> Self {
        CeremonyEvent::BiometricResult {
            success: true,
            error: None,
        }
    }

    /// Biometric rejection with an optional explanation.
    pub fn biometric_rejected(error: Option<String>) -> Self {
        CeremonyEvent::BiometricResult {
            success: false,
            error,
        }
    }
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    /// Moved forward to a non-terminal stage
    Advanced {
        /// Stage before the event
        from: CeremonyStage,
        /// Stage after the event
        to: CeremonyStage,
    },
    /// Reached `Completed`, `Failed` or `Cancelled`
    Terminated {
        /// Stage before the event
        from: CeremonyStage,
        /// Terminal stage
        to: CeremonyStage,
    },
    /// Event was valid but changed nothing
    Unchanged,
    /// Event was ignored
    Discarded {
        /// Why it was ignored
        reason: DiscardReason,
    },
}

impl Transition {
    /// Whether the request changed.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Transition::Advanced { .. } | Transition::Terminated { .. }
        )
    }

    /// Stage entered by this transition, if any.
    pub fn entered(&self) -> Option<CeremonyStage> {
        match self {
            Transition::Advanced { to, .. } | Transition::Terminated { to, .. } => Some(*to),
            Transition::Unchanged | Transition::Discarded { .. } => None,
        }
    }
}

/// Why an event was ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscardReason {
    /// The event belongs to a stage the ceremony is not in
    StaleStageResult {
        /// Stage the ceremony is actually in
        current: CeremonyStage,
    },
    /// A timer fired before its scheduled wake
    Premature {
        /// Scheduled wake time
        wake_at_ms: u64,
    },
    /// The ceremony already reached a terminal status
    AlreadyTerminal {
        /// Its final status
        status: CeremonyStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_stage() {
        assert_eq!(
            CeremonyEvent::biometric_accepted().target_stage(),
            Some(CeremonyStage::BiometricPending)
        );
        assert_eq!(
            CeremonyEvent::DesktopConfirmed { confirmed: true }.target_stage(),
            Some(CeremonyStage::DesktopConfirmationPending)
        );
        assert_eq!(CeremonyEvent::ExpiryTick.target_stage(), None);
        assert_eq!(CeremonyEvent::CancelRequested.target_stage(), None);
    }

    #[test]
    fn test_event_wire_format() {
        let json = serde_json::to_value(CeremonyEvent::TimerElapsed {
            stage: CeremonyStage::RehydrationPending,
        })
        .unwrap();
        assert_eq!(json["type"], "timer_elapsed");
        assert_eq!(json["stage"], "RehydrationPending");

        let parsed: CeremonyEvent =
            serde_json::from_str(r#"{"type":"desktop_confirmed","confirmed":false}"#).unwrap();
        assert_eq!(parsed, CeremonyEvent::DesktopConfirmed { confirmed: false });
    }

    #[test]
    fn test_transition_helpers() {
        let advanced = Transition::Advanced {
            from: CeremonyStage::BiometricPending,
            to: CeremonyStage::TimeDelayPending,
        };
        assert!(advanced.is_change());
        assert_eq!(advanced.entered(), Some(CeremonyStage::TimeDelayPending));
        assert!(!Transition::Unchanged.is_change());
    }
}
