//! Unlock ceremony driver.
//!
//! [`UnlockCeremony`] owns the request pool and is the only writer of
//! request state. Every mutation goes through [`apply`] under the registry
//! write lock; side effects (logging, audit facts, capability calls) run
//! after the lock is released.
//!
//! Capability calls for the biometric, desktop and integrity stages run as
//! tracked tokio tasks that feed their verdict back through
//! [`UnlockCeremony::advance`]. Timed stages and the deadline are driven by
//! [`UnlockCeremony::tick`], usually from a [`crate::CeremonyScheduler`].

use crate::config::{StageTimings, UnlockCeremonyConfig};
use crate::effects::UnlockCeremonyEffects;
use crate::errors::{UnlockError, UnlockResult};
use crate::event::{CeremonyEvent, Transition};
use crate::facts::UnlockCeremonyFact;
use crate::registry::CeremonyRegistry;
use crate::state_machine::apply;
use crate::tasks::StageTaskRegistry;
use crate::types::{validate_reason, CeremonyStage, UnlockRequest};
use acey_core::effects::RiskLevel;
use acey_core::CeremonyId;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Risk level passed to the biometric authenticator for every ceremony.
pub const CEREMONY_RISK_LEVEL: RiskLevel = RiskLevel::Critical;

/// What a call to [`UnlockCeremony::tick`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Clock reading used for the tick
    pub now_ms: u64,
    /// Ceremonies failed by the deadline
    pub expired: Vec<CeremonyId>,
    /// Ceremonies moved forward by a due wake
    pub advanced: Vec<CeremonyId>,
}

struct Inner<E> {
    effects: E,
    config: UnlockCeremonyConfig,
    timings: StageTimings,
    registry: RwLock<CeremonyRegistry>,
    tasks: StageTaskRegistry,
}

/// Secure unlock ceremony driver.
///
/// Cheap to clone; clones share the same request pool.
pub struct UnlockCeremony<E: UnlockCeremonyEffects> {
    inner: Arc<Inner<E>>,
}

impl<E: UnlockCeremonyEffects> Clone for UnlockCeremony<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E: UnlockCeremonyEffects> std::fmt::Debug for UnlockCeremony<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockCeremony")
            .field("config", &self.inner.config)
            .field("requests", &self.inner.registry.read().len())
            .finish_non_exhaustive()
    }
}

impl<E: UnlockCeremonyEffects> UnlockCeremony<E> {
    /// Create a driver after validating `config`.
    pub fn new(effects: E, config: UnlockCeremonyConfig) -> UnlockResult<Self> {
        config.validate()?;
        let timings = config.timings();
        Ok(Self {
            inner: Arc::new(Inner {
                effects,
                config,
                timings,
                registry: RwLock::new(CeremonyRegistry::new()),
                tasks: StageTaskRegistry::new(),
            }),
        })
    }

    /// Create a driver with default configuration.
    pub fn with_defaults(effects: E) -> UnlockResult<Self> {
        Self::new(effects, UnlockCeremonyConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &UnlockCeremonyConfig {
        &self.inner.config
    }

    /// Effect handlers
    pub fn effects(&self) -> &E {
        &self.inner.effects
    }

    // =========================================================================
    // CALLER OPERATIONS
    // =========================================================================

    /// Start a new ceremony and issue the biometric request.
    ///
    /// A pending ceremony whose deadline has passed is failed first, so a
    /// lapsed ceremony never blocks a new one.
    pub async fn start(&self, reason: &str) -> UnlockResult<UnlockRequest> {
        let reason = validate_reason(reason)?;
        let now_ms = self.now_ms().await?;
        let id = CeremonyId::from_uuid(self.inner.effects.random_uuid().await?);

        let (lapsed, request) = {
            let mut registry = self.inner.registry.write();
            let lapsed = match registry.active_id() {
                Some(active_id) => {
                    let active = registry.require_mut(&active_id)?;
                    let transition =
                        apply(active, CeremonyEvent::ExpiryTick, now_ms, &self.inner.timings);
                    transition
                        .is_change()
                        .then(|| (transition, active.clone()))
                }
                None => None,
            };
            let request =
                UnlockRequest::new(id, &reason, now_ms, self.inner.config.ceremony_timeout_ms)?;
            registry.admit(request.clone())?;
            (lapsed, request)
        };

        if let Some((transition, snapshot)) = lapsed {
            self.after_transition(&snapshot, "expiry_tick", &transition, now_ms)
                .await;
        }

        info!(
            ceremony_id = %id,
            reason = %request.reason(),
            expires_at_ms = request.expires_at_ms(),
            "Unlock ceremony started"
        );
        self.emit(UnlockCeremonyFact::CeremonyStarted {
            ceremony_id: id,
            reason: request.reason().to_string(),
            expires_at_ms: request.expires_at_ms(),
            started_at_ms: now_ms,
        })
        .await;

        self.spawn_stage_task(&request);
        Ok(request)
    }

    /// Feed one event to a ceremony.
    ///
    /// Stale, premature and post-terminal events come back as
    /// [`Transition::Discarded`], not as errors.
    pub async fn advance(&self, id: CeremonyId, event: CeremonyEvent) -> UnlockResult<Transition> {
        let now_ms = self.now_ms().await?;
        let kind = event.kind();
        let (transition, snapshot) = self.apply_locked(id, event, now_ms)?;
        self.after_transition(&snapshot, kind, &transition, now_ms)
            .await;
        Ok(transition)
    }

    /// Cancel a pending ceremony.
    ///
    /// Fails with `NotCancellable` if the ceremony is terminal, including
    /// when its deadline had already passed at the time of the request.
    /// In-flight capability calls are left to finish; their results are
    /// discarded.
    pub async fn cancel(&self, id: CeremonyId) -> UnlockResult<UnlockRequest> {
        let now_ms = self.now_ms().await?;
        let (transition, snapshot) = {
            let mut registry = self.inner.registry.write();
            let request = registry.require_mut(&id)?;
            if !request.is_pending() {
                return Err(UnlockError::NotCancellable {
                    id,
                    status: request.status(),
                });
            }
            let transition = apply(
                request,
                CeremonyEvent::CancelRequested,
                now_ms,
                &self.inner.timings,
            );
            (transition, request.clone())
        };
        self.after_transition(&snapshot, "cancel_requested", &transition, now_ms)
            .await;

        if snapshot.stage() != CeremonyStage::Cancelled {
            return Err(UnlockError::NotCancellable {
                id,
                status: snapshot.status(),
            });
        }
        Ok(snapshot)
    }

    /// Fail the ceremony if its deadline has passed; returns the snapshot.
    pub async fn check_expiry(&self, id: CeremonyId) -> UnlockResult<UnlockRequest> {
        let now_ms = self.now_ms().await?;
        let (transition, snapshot) = self.apply_locked(id, CeremonyEvent::ExpiryTick, now_ms)?;
        self.after_transition(&snapshot, "expiry_tick", &transition, now_ms)
            .await;
        Ok(snapshot)
    }

    /// Current snapshot, with the deadline enforced first.
    pub async fn status(&self, id: CeremonyId) -> UnlockResult<UnlockRequest> {
        self.check_expiry(id).await
    }

    /// Current snapshot without consulting the clock.
    pub fn snapshot(&self, id: CeremonyId) -> UnlockResult<UnlockRequest> {
        self.inner.registry.read().require(&id).cloned()
    }

    /// The pending ceremony, if any.
    pub fn active(&self) -> Option<UnlockRequest> {
        self.inner.registry.read().active().cloned()
    }

    /// Forget a terminal ceremony once its owner has seen the outcome.
    pub async fn acknowledge(&self, id: CeremonyId) -> UnlockResult<UnlockRequest> {
        let now_ms = self.now_ms().await?;
        let request = self.inner.registry.write().acknowledge(&id)?;
        info!(ceremony_id = %id, status = %request.status(), "Unlock ceremony acknowledged");
        self.emit(UnlockCeremonyFact::CeremonyAcknowledged {
            ceremony_id: id,
            status: request.status(),
            acknowledged_at_ms: now_ms,
        })
        .await;
        Ok(request)
    }

    // =========================================================================
    // DRIVER
    // =========================================================================

    /// Enforce deadlines and fire due wakes for every pending ceremony.
    pub async fn tick(&self) -> UnlockResult<TickReport> {
        let now_ms = self.now_ms().await?;
        let mut report = TickReport {
            now_ms,
            ..Default::default()
        };
        let pending = self.inner.registry.read().pending_ids();
        debug!(now_ms, pending = pending.len(), "Ceremony tick");

        for id in pending {
            let snapshot = self.snapshot(id)?;
            let stage = snapshot.stage();
            // A wake that fell due by the deadline fires at its own time,
            // even when this tick lands past the deadline.
            let due_at_ms = snapshot
                .next_wake_at_ms()
                .filter(|&wake_at_ms| {
                    stage.is_timed()
                        && wake_at_ms <= now_ms
                        && wake_at_ms <= snapshot.expires_at_ms()
                });
            if let Some(wake_at_ms) = due_at_ms {
                let (transition, snapshot) =
                    self.apply_locked(id, CeremonyEvent::TimerElapsed { stage }, wake_at_ms)?;
                if transition.is_change() {
                    report.advanced.push(id);
                }
                self.after_transition(&snapshot, "timer_elapsed", &transition, wake_at_ms)
                    .await;
            }

            let (transition, snapshot) = self.apply_locked(id, CeremonyEvent::ExpiryTick, now_ms)?;
            if transition.is_change() {
                report.expired.push(id);
                self.after_transition(&snapshot, "expiry_tick", &transition, now_ms)
                    .await;
            }
        }
        Ok(report)
    }

    /// Wait until every outstanding capability call has delivered its
    /// result.
    pub async fn wait_idle(&self) {
        self.inner.tasks.wait_idle().await;
    }

    /// Number of capability calls still outstanding.
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.in_flight()
    }

    /// Stop waiting on outstanding capability calls. Request state is left
    /// untouched.
    pub fn shutdown(&self) {
        self.inner.tasks.shutdown();
    }

    // =========================================================================
    // INTERNALS
    // =========================================================================

    async fn now_ms(&self) -> UnlockResult<u64> {
        Ok(self.inner.effects.physical_time().await?.ts_ms)
    }

    fn apply_locked(
        &self,
        id: CeremonyId,
        event: CeremonyEvent,
        now_ms: u64,
    ) -> UnlockResult<(Transition, UnlockRequest)> {
        let mut registry = self.inner.registry.write();
        let request = registry.require_mut(&id)?;
        let transition = apply(request, event, now_ms, &self.inner.timings);
        Ok((transition, request.clone()))
    }

    async fn after_transition(
        &self,
        snapshot: &UnlockRequest,
        event_kind: &str,
        transition: &Transition,
        now_ms: u64,
    ) {
        let id = snapshot.id();
        match transition {
            Transition::Advanced { from, to } => {
                info!(ceremony_id = %id, from = ?from, stage = ?to, "Ceremony stage entered");
                if let Some(wake_at_ms) = snapshot.next_wake_at_ms() {
                    debug!(ceremony_id = %id, stage = ?to, wake_at_ms, "Scheduled stage wake");
                }
                self.emit(UnlockCeremonyFact::StageEntered {
                    ceremony_id: id,
                    from: *from,
                    stage: *to,
                    wake_at_ms: snapshot.next_wake_at_ms(),
                    entered_at_ms: now_ms,
                })
                .await;
                self.spawn_stage_task(snapshot);
            }
            Transition::Terminated { from, to } => {
                self.record_outcome(snapshot, *from, *to, now_ms).await;
            }
            Transition::Unchanged => {}
            Transition::Discarded { reason } => {
                warn!(
                    ceremony_id = %id,
                    event = event_kind,
                    reason = ?reason,
                    "Discarded stale stage result"
                );
                self.emit(UnlockCeremonyFact::StageResultDiscarded {
                    ceremony_id: id,
                    event_kind: event_kind.to_string(),
                    reason: reason.clone(),
                    discarded_at_ms: now_ms,
                })
                .await;
            }
        }
    }

    async fn record_outcome(
        &self,
        snapshot: &UnlockRequest,
        from: CeremonyStage,
        to: CeremonyStage,
        now_ms: u64,
    ) {
        let id = snapshot.id();
        let integrity_checks = snapshot
            .results()
            .and_then(|r| r.integrity_checks())
            .map(<[_]>::to_vec);

        let fact = match to {
            CeremonyStage::Completed => {
                info!(ceremony_id = %id, "Unlock ceremony completed");
                UnlockCeremonyFact::CeremonyCompleted {
                    ceremony_id: id,
                    integrity_checks: integrity_checks.unwrap_or_default(),
                    completed_at_ms: now_ms,
                }
            }
            CeremonyStage::Cancelled => {
                info!(ceremony_id = %id, stage = ?from, "Unlock ceremony cancelled");
                UnlockCeremonyFact::CeremonyCancelled {
                    ceremony_id: id,
                    stage: from,
                    cancelled_at_ms: now_ms,
                }
            }
            _ => {
                let Some(failure) = snapshot.failure().cloned() else {
                    warn!(ceremony_id = %id, stage = ?to, "Terminal transition without failure marker");
                    return;
                };
                warn!(
                    ceremony_id = %id,
                    stage = ?from,
                    marker = failure.marker(),
                    failure = %failure,
                    "Unlock ceremony failed"
                );
                UnlockCeremonyFact::CeremonyFailed {
                    ceremony_id: id,
                    stage: from,
                    failure,
                    integrity_checks,
                    failed_at_ms: now_ms,
                }
            }
        };
        self.emit(fact).await;
    }

    async fn emit(&self, fact: UnlockCeremonyFact) {
        let record = match fact.to_audit_record() {
            Ok(record) => record,
            Err(err) => {
                warn!(ceremony_id = %fact.ceremony_id(), error = %err, "Failed to encode audit fact");
                return;
            }
        };
        if let Err(err) = self.inner.effects.append_audit_record(record).await {
            warn!(
                ceremony_id = %fact.ceremony_id(),
                kind = fact.sub_type(),
                error = %err,
                "Failed to append audit record"
            );
        }
    }

    /// Issue the capability call for the stage `request` is in, if the
    /// stage has one.
    fn spawn_stage_task(&self, request: &UnlockRequest) {
        let id = request.id();
        let stage = request.stage();
        let ceremony = self.clone();

        match stage {
            CeremonyStage::BiometricPending => {
                let purpose = format!("{}: {}", self.inner.config.biometric_purpose, request.reason());
                self.inner.tasks.spawn(async move {
                    let event = match ceremony
                        .inner
                        .effects
                        .authenticate(&purpose, CEREMONY_RISK_LEVEL)
                        .await
                    {
                        Ok(result) => CeremonyEvent::BiometricResult {
                            success: result.success,
                            error: result.error,
                        },
                        Err(err) => CeremonyEvent::CapabilityFailed {
                            stage,
                            reason: err.to_string(),
                        },
                    };
                    ceremony.deliver(id, event).await;
                });
            }
            CeremonyStage::DesktopConfirmationPending => {
                self.inner.tasks.spawn(async move {
                    let event = match ceremony.inner.effects.await_confirmation(id).await {
                        Ok(confirmation) => CeremonyEvent::DesktopConfirmed {
                            confirmed: confirmation.confirmed,
                        },
                        Err(err) => CeremonyEvent::CapabilityFailed {
                            stage,
                            reason: err.to_string(),
                        },
                    };
                    ceremony.deliver(id, event).await;
                });
            }
            CeremonyStage::IntegrityCheckPending => {
                self.inner.tasks.spawn(async move {
                    let event = match ceremony.inner.effects.run_checks(id).await {
                        Ok(checks) => CeremonyEvent::IntegrityResults { checks },
                        Err(err) => CeremonyEvent::CapabilityFailed {
                            stage,
                            reason: err.to_string(),
                        },
                    };
                    ceremony.deliver(id, event).await;
                });
            }
            CeremonyStage::TimeDelayPending
            | CeremonyStage::RehydrationPending
            | CeremonyStage::Completed
            | CeremonyStage::Failed
            | CeremonyStage::Cancelled => {}
        }
    }

    async fn deliver(&self, id: CeremonyId, event: CeremonyEvent) {
        let kind = event.kind();
        let stage = event.target_stage();
        if let Err(err) = self.advance(id, event).await {
            warn!(
                ceremony_id = %id,
                event = kind,
                stage = ?stage,
                error = %err,
                "Stage result not applied"
            );
        }
    }
}
