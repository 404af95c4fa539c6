//! Single-instance, idempotence, audit and acknowledgement behaviour.

use acey_core::effects::RiskLevel;
use acey_testkit::{CeremonyHarness, MockCeremonyEffects};
use acey_unlock::{
    CeremonyEvent, CeremonyStage, CeremonyStatus, DiscardReason, Transition, UnlockCeremony,
    UnlockCeremonyConfig, UnlockCeremonyFact, UnlockError,
};
use assert_matches::assert_matches;

fn setup() -> (CeremonyHarness, UnlockCeremony<MockCeremonyEffects>) {
    let harness = CeremonyHarness::new();
    let ceremony = UnlockCeremony::with_defaults(harness.effects()).unwrap();
    (harness, ceremony)
}

#[tokio::test]
async fn second_start_rejected_while_pending() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let first = ceremony.start("emergency lock recovery").await.unwrap();

    let err = ceremony.start("another reason").await.unwrap_err();
    assert_eq!(err, UnlockError::CeremonyAlreadyActive { active: first.id() });
    assert_eq!(ceremony.snapshot(first.id()).unwrap(), first);
    assert_eq!(ceremony.active().map(|r| r.id()), Some(first.id()));

    // Let the parked biometric task record its call.
    tokio::task::yield_now().await;
    assert_eq!(harness.biometric.calls().len(), 1);
}

#[tokio::test]
async fn terminal_ceremony_frees_the_slot() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let first = ceremony.start("first").await.unwrap();
    ceremony.cancel(first.id()).await.unwrap();

    let second = ceremony.start("second").await.unwrap();
    assert_ne!(first.id(), second.id());
    assert_eq!(ceremony.active().map(|r| r.id()), Some(second.id()));
}

#[tokio::test]
async fn lapsed_ceremony_does_not_block_start() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let first = ceremony.start("first").await.unwrap();

    harness.clock.advance_ms(ceremony.config().ceremony_timeout_ms + 1);
    let second = ceremony.start("second").await.unwrap();

    let first = ceremony.snapshot(first.id()).unwrap();
    assert_eq!(first.status(), CeremonyStatus::Failed);
    assert!(first.results().unwrap().is_expired());
    assert!(second.is_pending());
}

#[tokio::test]
async fn blank_reason_is_rejected() {
    let (_harness, ceremony) = setup();
    assert_matches!(
        ceremony.start("   \t").await,
        Err(UnlockError::InvalidReason { .. })
    );
    assert!(ceremony.active().is_none());
}

#[tokio::test]
async fn biometric_always_requested_at_critical_risk() {
    let (harness, ceremony) = setup();
    harness.biometric.reject_next("no match");
    let first = ceremony.start("low severity incident").await.unwrap();
    ceremony.wait_idle().await;
    ceremony.acknowledge(first.id()).await.unwrap();
    ceremony.start("another").await.unwrap();
    ceremony.wait_idle().await;

    let calls = harness.biometric.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(_, risk)| *risk == RiskLevel::Critical));
}

#[tokio::test]
async fn duplicate_biometric_result_is_noop() {
    let (_harness, ceremony) = setup();
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;
    let before = ceremony.snapshot(request.id()).unwrap();
    assert_eq!(before.stage(), CeremonyStage::TimeDelayPending);

    let outcome = ceremony
        .advance(request.id(), CeremonyEvent::biometric_accepted())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Transition::Discarded {
            reason: DiscardReason::StaleStageResult {
                current: CeremonyStage::TimeDelayPending
            }
        }
    );
    assert_eq!(ceremony.snapshot(request.id()).unwrap(), before);
}

#[tokio::test]
async fn time_delay_cannot_be_skipped() {
    let (harness, ceremony) = setup();
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;

    harness.clock.advance_ms(59_999);
    let outcome = ceremony
        .advance(
            request.id(),
            CeremonyEvent::TimerElapsed {
                stage: CeremonyStage::TimeDelayPending,
            },
        )
        .await
        .unwrap();
    assert_matches!(
        outcome,
        Transition::Discarded {
            reason: DiscardReason::Premature { .. }
        }
    );

    let report = ceremony.tick().await.unwrap();
    assert!(report.advanced.is_empty());
    assert_eq!(
        ceremony.snapshot(request.id()).unwrap().stage(),
        CeremonyStage::TimeDelayPending
    );

    // Out-of-order desktop confirmation before the delay is stale.
    let outcome = ceremony
        .advance(
            request.id(),
            CeremonyEvent::DesktopConfirmed { confirmed: true },
        )
        .await
        .unwrap();
    assert_matches!(outcome, Transition::Discarded { .. });
}

#[tokio::test]
async fn replayed_time_delay_wake_cannot_finish_rehydration() {
    let (harness, ceremony) = setup();
    harness.desktop.confirm();
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;
    harness.clock.advance_ms(60_000);
    ceremony.tick().await.unwrap();
    ceremony.wait_idle().await;
    assert_eq!(
        ceremony.snapshot(request.id()).unwrap().stage(),
        CeremonyStage::RehydrationPending
    );

    harness.clock.advance_ms(20_000);
    let outcome = ceremony
        .advance(
            request.id(),
            CeremonyEvent::TimerElapsed {
                stage: CeremonyStage::TimeDelayPending,
            },
        )
        .await
        .unwrap();
    assert_matches!(outcome, Transition::Discarded { .. });
    assert!(ceremony.snapshot(request.id()).unwrap().is_pending());
}

#[tokio::test]
async fn cancel_after_unmarked_expiry_is_not_cancellable() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let request = ceremony.start("test").await.unwrap();

    harness.clock.advance_ms(ceremony.config().ceremony_timeout_ms + 1);
    assert_matches!(
        ceremony.cancel(request.id()).await,
        Err(UnlockError::NotCancellable {
            status: CeremonyStatus::Failed,
            ..
        })
    );
    let snapshot = ceremony.snapshot(request.id()).unwrap();
    assert!(snapshot.results().unwrap().is_expired());
}

#[tokio::test]
async fn status_query_enforces_deadline() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let request = ceremony.start("test").await.unwrap();

    harness.clock.advance_ms(ceremony.config().ceremony_timeout_ms);
    assert!(ceremony.status(request.id()).await.unwrap().is_pending());

    harness.clock.advance_ms(1);
    assert_eq!(
        ceremony.status(request.id()).await.unwrap().status(),
        CeremonyStatus::Failed
    );
}

#[tokio::test]
async fn acknowledge_forgets_only_terminal_ceremonies() {
    let (harness, ceremony) = setup();
    harness.biometric.hold();
    let request = ceremony.start("x").await.unwrap();

    assert_eq!(
        ceremony.acknowledge(request.id()).await.unwrap_err(),
        UnlockError::NotTerminal { id: request.id() }
    );

    ceremony.cancel(request.id()).await.unwrap();
    let forgotten = ceremony.acknowledge(request.id()).await.unwrap();
    assert_eq!(forgotten.status(), CeremonyStatus::Cancelled);
    assert_eq!(
        ceremony.snapshot(request.id()).unwrap_err(),
        UnlockError::NotFound { id: request.id() }
    );
    assert_eq!(harness.audit.of_kind("acknowledged").len(), 1);

    // The parked biometric call finds nothing to update.
    harness.biometric.release();
    ceremony.wait_idle().await;
}

#[tokio::test]
async fn happy_path_audit_trail() {
    let (harness, ceremony) = setup();
    harness.desktop.confirm();
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;
    harness.clock.advance_ms(60_000);
    ceremony.tick().await.unwrap();
    ceremony.wait_idle().await;
    harness.clock.advance_ms(10_000);
    ceremony.tick().await.unwrap();

    assert_eq!(
        harness.audit.kinds(),
        vec![
            "started",
            "stage-entered",
            "stage-entered",
            "stage-entered",
            "stage-entered",
            "completed"
        ]
    );

    let entered: Vec<CeremonyStage> = harness
        .audit
        .of_kind("stage-entered")
        .iter()
        .filter_map(UnlockCeremonyFact::from_audit_record)
        .filter_map(|fact| match fact {
            UnlockCeremonyFact::StageEntered { stage, .. } => Some(stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        entered,
        vec![
            CeremonyStage::TimeDelayPending,
            CeremonyStage::DesktopConfirmationPending,
            CeremonyStage::IntegrityCheckPending,
            CeremonyStage::RehydrationPending,
        ]
    );

    let records = harness.audit.records();
    assert!(records
        .iter()
        .all(|r| r.key.contains(&request.id().to_string())));
    assert!(records.iter().all(|r| r.key.starts_with("unlock:")));
}

#[tokio::test]
async fn audit_sink_failure_is_not_fatal() {
    let (harness, ceremony) = setup();
    harness.audit.set_failing(true);
    harness.desktop.confirm();
    let request = ceremony.start("emergency lock recovery").await.unwrap();
    ceremony.wait_idle().await;
    harness.clock.advance_ms(60_000);
    ceremony.tick().await.unwrap();
    ceremony.wait_idle().await;
    harness.clock.advance_ms(10_000);
    ceremony.tick().await.unwrap();

    assert_eq!(
        ceremony.snapshot(request.id()).unwrap().status(),
        CeremonyStatus::Completed
    );
    assert!(harness.audit.records().is_empty());
}

#[tokio::test]
async fn custom_timings_are_honoured() {
    let harness = CeremonyHarness::new();
    let config = UnlockCeremonyConfig {
        ceremony_timeout_ms: 10_000,
        time_delay_ms: 2_000,
        rehydration_ms: 500,
        ..Default::default()
    };
    let ceremony = UnlockCeremony::new(harness.effects(), config).unwrap();
    harness.desktop.confirm();
    let request = ceremony.start("drill").await.unwrap();
    ceremony.wait_idle().await;

    harness.clock.advance_ms(2_000);
    ceremony.tick().await.unwrap();
    ceremony.wait_idle().await;
    harness.clock.advance_ms(500);
    ceremony.tick().await.unwrap();

    assert_eq!(
        ceremony.snapshot(request.id()).unwrap().status(),
        CeremonyStatus::Completed
    );
}
