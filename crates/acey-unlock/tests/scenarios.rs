//! End-to-end ceremony scenarios driven by a manual clock.

use acey_core::effects::integrity::{DATABASE_SCHEMA, STANDARD_INTEGRITY_BATTERY};
use acey_core::AceyError;
use acey_testkit::{CeremonyHarness, MockCeremonyEffects};
use acey_unlock::{
    CeremonyFailure, CeremonyStage, CeremonyStatus, UnlockCeremony, UnlockCeremonyConfig,
    UnlockError, UnlockRequest,
};
use assert_matches::assert_matches;

const TIME_DELAY_MS: u64 = 60_000;
const REHYDRATION_MS: u64 = 10_000;
const TIMEOUT_MS: u64 = 300_000;

fn setup() -> (CeremonyHarness, UnlockCeremony<MockCeremonyEffects>) {
    let harness = CeremonyHarness::new();
    let ceremony = UnlockCeremony::with_defaults(harness.effects()).unwrap();
    (harness, ceremony)
}

/// Start a ceremony and walk it to `DesktopConfirmationPending`.
async fn start_to_desktop(
    harness: &CeremonyHarness,
    ceremony: &UnlockCeremony<MockCeremonyEffects>,
    reason: &str,
) -> UnlockRequest {
    let request = ceremony.start(reason).await.unwrap();
    ceremony.wait_idle().await;
    assert_eq!(
        ceremony.snapshot(request.id()).unwrap().stage(),
        CeremonyStage::TimeDelayPending
    );

    harness.clock.advance_ms(TIME_DELAY_MS);
    ceremony.tick().await.unwrap();
    let snapshot = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(snapshot.stage(), CeremonyStage::DesktopConfirmationPending);
    snapshot
}

#[tokio::test]
async fn scenario_a_full_ceremony_completes() {
    let (harness, ceremony) = setup();
    let request = start_to_desktop(&harness, &ceremony, "emergency lock recovery").await;
    assert_eq!(request.reason(), "emergency lock recovery");

    harness.desktop.confirm();
    ceremony.wait_idle().await;
    let snapshot = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(snapshot.stage(), CeremonyStage::RehydrationPending);
    assert!(snapshot.is_pending());

    harness.clock.advance_ms(REHYDRATION_MS);
    let report = ceremony.tick().await.unwrap();
    assert_eq!(report.advanced, vec![request.id()]);

    let done = ceremony.status(request.id()).await.unwrap();
    assert_eq!(done.stage(), CeremonyStage::Completed);
    assert_eq!(done.status(), CeremonyStatus::Completed);
    let checks = done.results().unwrap().integrity_checks().unwrap();
    assert_eq!(checks.len(), STANDARD_INTEGRITY_BATTERY.len());
    assert!(checks.iter().all(|c| c.passed));
    assert!(done.failure().is_none());
    assert!(ceremony.active().is_none());
}

#[tokio::test]
async fn scenario_b_one_failing_check_fails_with_full_list() {
    let (harness, ceremony) = setup();
    harness.integrity.fail_checks(&[DATABASE_SCHEMA]);
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    harness.desktop.confirm();
    ceremony.wait_idle().await;

    let done = ceremony.status(request.id()).await.unwrap();
    assert_eq!(done.status(), CeremonyStatus::Failed);
    assert_eq!(
        done.failure(),
        Some(&CeremonyFailure::IntegrityCheckFailed {
            failed: vec![DATABASE_SCHEMA.to_string()]
        })
    );
    let checks = done.results().unwrap().integrity_checks().unwrap();
    assert_eq!(checks.len(), 4);
    let failing: Vec<_> = checks.iter().filter(|c| !c.passed).collect();
    assert_eq!(failing.len(), 1);
    assert_eq!(failing[0].name, DATABASE_SCHEMA);
}

#[tokio::test]
async fn scenario_c_no_biometric_response_expires() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let request = ceremony.start("test").await.unwrap();

    harness.clock.advance_ms(TIMEOUT_MS + 1);
    let expired = ceremony.check_expiry(request.id()).await.unwrap();
    assert_eq!(expired.status(), CeremonyStatus::Failed);
    assert_matches!(
        expired.failure(),
        Some(CeremonyFailure::Expired {
            stage: CeremonyStage::BiometricPending,
            ..
        })
    );
    assert_eq!(expired.failure().unwrap().marker(), "expired");

    // Late biometric success is a no-op.
    harness.biometric.release();
    ceremony.wait_idle().await;
    assert_eq!(ceremony.snapshot(request.id()).unwrap(), expired);
    assert_eq!(harness.audit.of_kind("stale-stage-result").len(), 1);
}

#[tokio::test]
async fn scenario_d_cancel_while_biometric_pending() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let request = ceremony.start("x").await.unwrap();

    let cancelled = ceremony.cancel(request.id()).await.unwrap();
    assert_eq!(cancelled.status(), CeremonyStatus::Cancelled);
    assert_eq!(cancelled.stage(), CeremonyStage::Cancelled);

    harness.biometric.release();
    ceremony.wait_idle().await;
    assert_eq!(ceremony.snapshot(request.id()).unwrap(), cancelled);
}

#[tokio::test]
async fn biometric_rejection_fails_immediately() {
    let (harness, ceremony) = setup();
    harness.biometric.reject_next("fingerprint mismatch");
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;

    let done = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(done.status(), CeremonyStatus::Failed);
    assert_eq!(
        done.failure(),
        Some(&CeremonyFailure::BiometricRejected {
            reason: Some("fingerprint mismatch".into())
        })
    );
    assert!(harness.desktop.calls().is_empty());
}

#[tokio::test]
async fn biometric_error_becomes_failed_state() {
    let (harness, ceremony) = setup();
    harness
        .biometric
        .fail_next(AceyError::unavailable("sensor offline"));
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;

    assert_matches!(
        ceremony.snapshot(request.id()).unwrap().failure(),
        Some(CeremonyFailure::CapabilityUnavailable {
            stage: CeremonyStage::BiometricPending,
            ..
        })
    );
    assert!(harness.desktop.calls().is_empty());
}

#[tokio::test]
async fn rejected_ceremony_can_be_retried() {
    let (harness, ceremony) = setup();
    harness.biometric.reject_next("fingerprint mismatch");
    harness.biometric.accept_next();

    let first = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;
    assert_eq!(
        ceremony.snapshot(first.id()).unwrap().status(),
        CeremonyStatus::Failed
    );

    let second = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;
    assert_eq!(
        ceremony.snapshot(second.id()).unwrap().stage(),
        CeremonyStage::TimeDelayPending
    );
    assert_eq!(harness.biometric.calls().len(), 2);
}

#[tokio::test]
async fn desktop_denial_fails() {
    let (harness, ceremony) = setup();
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    harness.desktop.deny();
    ceremony.wait_idle().await;

    let done = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(done.failure(), Some(&CeremonyFailure::DesktopDenied));
    assert!(harness.integrity.calls().is_empty());
}

#[tokio::test]
async fn capability_error_becomes_failed_state() {
    let (harness, ceremony) = setup();
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    harness
        .desktop
        .fail_with(AceyError::unavailable("desktop peer unreachable"));
    ceremony.wait_idle().await;

    let done = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(done.status(), CeremonyStatus::Failed);
    assert_matches!(
        done.failure(),
        Some(CeremonyFailure::CapabilityUnavailable {
            stage: CeremonyStage::DesktopConfirmationPending,
            ..
        })
    );
}

#[tokio::test]
async fn integrity_scanner_error_becomes_failed_state() {
    let (harness, ceremony) = setup();
    harness
        .integrity
        .fail_with(AceyError::internal("scanner crashed"));
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    harness.desktop.confirm();
    ceremony.wait_idle().await;

    assert_matches!(
        ceremony.snapshot(request.id()).unwrap().failure(),
        Some(CeremonyFailure::CapabilityUnavailable {
            stage: CeremonyStage::IntegrityCheckPending,
            ..
        })
    );
}

#[tokio::test]
async fn desktop_confirmation_after_expiry_is_rejected() {
    let (harness, ceremony) = setup();
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    harness.clock.advance_ms(TIMEOUT_MS);
    let expired = ceremony.check_expiry(request.id()).await.unwrap();
    assert!(expired.results().unwrap().is_expired());

    harness.desktop.confirm();
    ceremony.wait_idle().await;

    let after = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(after, expired);
    assert!(harness.integrity.calls().is_empty());
}

#[tokio::test]
async fn expiry_wins_when_confirmation_arrives_past_deadline() {
    let (harness, ceremony) = setup();
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    // Deadline passes with nobody checking; the confirmation lands first.
    harness.clock.advance_ms(TIMEOUT_MS);
    harness.desktop.confirm();
    ceremony.wait_idle().await;

    let done = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(done.status(), CeremonyStatus::Failed);
    assert!(done.results().unwrap().is_expired());
    assert!(harness.integrity.calls().is_empty());
}

#[tokio::test]
async fn cancel_during_rehydration() {
    let (harness, ceremony) = setup();
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;
    harness.desktop.confirm();
    ceremony.wait_idle().await;

    let cancelled = ceremony.cancel(request.id()).await.unwrap();
    assert_eq!(cancelled.status(), CeremonyStatus::Cancelled);

    harness.clock.advance_ms(REHYDRATION_MS);
    ceremony.tick().await.unwrap();
    assert_eq!(ceremony.snapshot(request.id()).unwrap(), cancelled);

    assert_matches!(
        ceremony.cancel(request.id()).await,
        Err(UnlockError::NotCancellable {
            status: CeremonyStatus::Cancelled,
            ..
        })
    );
}

#[tokio::test]
async fn empty_integrity_battery_fails() {
    let (harness, ceremony) = setup();
    harness.integrity.respond_with(Vec::new());
    let request = start_to_desktop(&harness, &ceremony, "trust collapse").await;

    harness.desktop.confirm();
    ceremony.wait_idle().await;

    let done = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(done.status(), CeremonyStatus::Failed);
    assert_eq!(done.failure(), Some(&CeremonyFailure::NoIntegrityChecks));
    assert_eq!(harness.integrity.calls(), vec![request.id()]);
}

/// Deadline 500ms after the rehydration wake when every stage answers
/// promptly.
fn tight_config() -> UnlockCeremonyConfig {
    UnlockCeremonyConfig {
        ceremony_timeout_ms: 3_000,
        time_delay_ms: 2_000,
        rehydration_ms: 500,
        ..Default::default()
    }
}

#[tokio::test]
async fn wake_due_before_deadline_completes_on_late_tick() {
    let harness = CeremonyHarness::new();
    let ceremony = UnlockCeremony::new(harness.effects(), tight_config()).unwrap();
    harness.desktop.confirm();
    let request = ceremony.start("trust collapse").await.unwrap();
    ceremony.wait_idle().await;

    harness.clock.advance_ms(2_000);
    ceremony.tick().await.unwrap();
    ceremony.wait_idle().await;

    let rehydrating = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(rehydrating.stage(), CeremonyStage::RehydrationPending);
    let wake_at_ms = rehydrating.next_wake_at_ms().unwrap();
    assert_eq!(rehydrating.expires_at_ms() - wake_at_ms, 500);

    // The tick lands just past the deadline; the wake fell due first.
    harness.clock.set_ms(rehydrating.expires_at_ms() + 1);
    let report = ceremony.tick().await.unwrap();
    assert_eq!(report.advanced, vec![request.id()]);
    assert!(report.expired.is_empty());

    let done = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(done.status(), CeremonyStatus::Completed);
    assert!(done.failure().is_none());
}

#[tokio::test]
async fn wake_due_after_deadline_expires() {
    let harness = CeremonyHarness::new();
    let ceremony = UnlockCeremony::new(harness.effects(), tight_config()).unwrap();
    let request = ceremony.start("trust collapse").await.unwrap();
    ceremony.wait_idle().await;

    harness.clock.advance_ms(2_000);
    ceremony.tick().await.unwrap();

    // Slow desktop answer pushes the rehydration wake past the deadline.
    harness.clock.advance_ms(800);
    harness.desktop.confirm();
    ceremony.wait_idle().await;

    let rehydrating = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(rehydrating.stage(), CeremonyStage::RehydrationPending);
    let wake_at_ms = rehydrating.next_wake_at_ms().unwrap();
    assert!(wake_at_ms > rehydrating.expires_at_ms());

    harness.clock.set_ms(wake_at_ms + 1);
    let report = ceremony.tick().await.unwrap();
    assert_eq!(report.expired, vec![request.id()]);
    assert!(report.advanced.is_empty());
    assert_matches!(
        ceremony.snapshot(request.id()).unwrap().failure(),
        Some(CeremonyFailure::Expired {
            stage: CeremonyStage::RehydrationPending,
            ..
        })
    );
}
