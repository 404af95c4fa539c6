//! The ceremony transition function.
//!
//! [`apply`] is pure over its inputs: it reads the clock only through
//! `now_ms` and performs no I/O. The async driver in [`crate::ceremony`]
//! serializes calls per request and performs the side effects implied by
//! the returned [`Transition`].
//!
//! Precedence, highest first:
//! 1. terminal requests ignore everything (`ExpiryTick` is a no-op)
//! 2. a passed deadline fails the request, whatever the event
//! 3. the `(stage, event)` table

use crate::config::StageTimings;
use crate::event::{CeremonyEvent, DiscardReason, Transition};
use crate::types::{CeremonyFailure, CeremonyStage, UnlockRequest};
use acey_core::effects::IntegrityCheck;

/// Apply one event to `request` at time `now_ms`.
pub fn apply(
    request: &mut UnlockRequest,
    event: CeremonyEvent,
    now_ms: u64,
    timings: &StageTimings,
) -> Transition {
    use CeremonyEvent as E;
    use CeremonyStage as S;

    let current = request.stage();

    if request.is_terminal() {
        return match event {
            E::ExpiryTick => Transition::Unchanged,
            _ => Transition::Discarded {
                reason: DiscardReason::AlreadyTerminal {
                    status: request.status(),
                },
            },
        };
    }

    if request.is_expired_at(now_ms) {
        let failure = CeremonyFailure::Expired {
            expires_at_ms: request.expires_at_ms(),
            stage: current,
        };
        return terminate(request, S::Failed, now_ms, Some(failure));
    }

    match current {
        S::BiometricPending => match event {
            E::BiometricResult { success: true, .. } => advance(
                request,
                S::TimeDelayPending,
                now_ms,
                Some(now_ms.saturating_add(timings.time_delay_ms)),
            ),
            E::BiometricResult {
                success: false,
                error,
            } => fail(request, now_ms, CeremonyFailure::BiometricRejected { reason: error }),
            E::CapabilityFailed { stage, reason } => capability_failed(request, stage, reason, now_ms),
            E::CancelRequested => terminate(request, S::Cancelled, now_ms, None),
            E::ExpiryTick => Transition::Unchanged,
            E::TimerElapsed { .. } | E::DesktopConfirmed { .. } | E::IntegrityResults { .. } => {
                stale(current)
            }
        },

        S::TimeDelayPending => match event {
            E::TimerElapsed {
                stage: S::TimeDelayPending,
            } => match due(request, now_ms) {
                Ok(()) => advance(request, S::DesktopConfirmationPending, now_ms, None),
                Err(discarded) => discarded,
            },
            E::CapabilityFailed { stage, reason } => capability_failed(request, stage, reason, now_ms),
            E::CancelRequested => terminate(request, S::Cancelled, now_ms, None),
            E::ExpiryTick => Transition::Unchanged,
            E::TimerElapsed { .. }
            | E::BiometricResult { .. }
            | E::DesktopConfirmed { .. }
            | E::IntegrityResults { .. } => stale(current),
        },

        S::DesktopConfirmationPending => match event {
            E::DesktopConfirmed { confirmed: true } => {
                advance(request, S::IntegrityCheckPending, now_ms, None)
            }
            E::DesktopConfirmed { confirmed: false } => {
                fail(request, now_ms, CeremonyFailure::DesktopDenied)
            }
            E::CapabilityFailed { stage, reason } => capability_failed(request, stage, reason, now_ms),
            E::CancelRequested => terminate(request, S::Cancelled, now_ms, None),
            E::ExpiryTick => Transition::Unchanged,
            E::BiometricResult { .. } | E::TimerElapsed { .. } | E::IntegrityResults { .. } => {
                stale(current)
            }
        },

        S::IntegrityCheckPending => match event {
            E::IntegrityResults { checks } => integrity_results(request, checks, now_ms, timings),
            E::CapabilityFailed { stage, reason } => capability_failed(request, stage, reason, now_ms),
            E::CancelRequested => terminate(request, S::Cancelled, now_ms, None),
            E::ExpiryTick => Transition::Unchanged,
            E::BiometricResult { .. } | E::TimerElapsed { .. } | E::DesktopConfirmed { .. } => {
                stale(current)
            }
        },

        S::RehydrationPending => match event {
            E::TimerElapsed {
                stage: S::RehydrationPending,
            } => match due(request, now_ms) {
                Ok(()) => terminate(request, S::Completed, now_ms, None),
                Err(discarded) => discarded,
            },
            E::CapabilityFailed { stage, reason } => capability_failed(request, stage, reason, now_ms),
            E::CancelRequested => terminate(request, S::Cancelled, now_ms, None),
            E::ExpiryTick => Transition::Unchanged,
            E::TimerElapsed { .. }
            | E::BiometricResult { .. }
            | E::DesktopConfirmed { .. }
            | E::IntegrityResults { .. } => stale(current),
        },

        // Unreachable: terminal requests returned above.
        S::Completed | S::Failed | S::Cancelled => Transition::Discarded {
            reason: DiscardReason::AlreadyTerminal {
                status: request.status(),
            },
        },
    }
}

fn advance(
    request: &mut UnlockRequest,
    to: CeremonyStage,
    now_ms: u64,
    wake_at_ms: Option<u64>,
) -> Transition {
    let from = request.stage();
    request.enter_stage(to, now_ms, wake_at_ms);
    Transition::Advanced { from, to }
}

fn terminate(
    request: &mut UnlockRequest,
    to: CeremonyStage,
    now_ms: u64,
    failure: Option<CeremonyFailure>,
) -> Transition {
    let from = request.stage();
    request.terminate(to, now_ms, failure);
    Transition::Terminated { from, to }
}

fn fail(request: &mut UnlockRequest, now_ms: u64, failure: CeremonyFailure) -> Transition {
    terminate(request, CeremonyStage::Failed, now_ms, Some(failure))
}

fn stale(current: CeremonyStage) -> Transition {
    Transition::Discarded {
        reason: DiscardReason::StaleStageResult { current },
    }
}

/// A timed stage may only advance once its wake time is reached.
fn due(request: &UnlockRequest, now_ms: u64) -> Result<(), Transition> {
    match request.next_wake_at_ms() {
        Some(wake_at_ms) if now_ms < wake_at_ms => Err(Transition::Discarded {
            reason: DiscardReason::Premature { wake_at_ms },
        }),
        _ => Ok(()),
    }
}

fn capability_failed(
    request: &mut UnlockRequest,
    stage: CeremonyStage,
    reason: String,
    now_ms: u64,
) -> Transition {
    let current = request.stage();
    if stage != current {
        return stale(current);
    }
    fail(
        request,
        now_ms,
        CeremonyFailure::CapabilityUnavailable { stage, reason },
    )
}

fn integrity_results(
    request: &mut UnlockRequest,
    checks: Vec<IntegrityCheck>,
    now_ms: u64,
    timings: &StageTimings,
) -> Transition {
    let failed: Vec<String> = checks
        .iter()
        .filter(|c| !c.passed)
        .map(|c| c.name.clone())
        .collect();
    let empty = checks.is_empty();
    request.record_integrity_checks(checks);

    if empty {
        fail(request, now_ms, CeremonyFailure::NoIntegrityChecks)
    } else if !failed.is_empty() {
        fail(request, now_ms, CeremonyFailure::IntegrityCheckFailed { failed })
    } else {
        advance(
            request,
            CeremonyStage::RehydrationPending,
            now_ms,
            Some(now_ms.saturating_add(timings.rehydration_ms)),
        )
    }
}
