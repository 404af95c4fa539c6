//! Effect composition.
//!
//! [`CeremonyEffectSystem`] bundles one handler per capability and
//! implements every effect trait by delegation, so a ceremony can be wired
//! from independently chosen handlers (real clock + console prompts, manual
//! clock + scripted mocks, ...).

use crate::{RealTimeHandler, SystemRandomHandler, TracingAuditHandler};
use acey_core::effects::{
    AuditEffects, AuditRecord, BiometricAuthResult, BiometricEffects, DesktopConfirmation,
    DesktopConfirmationEffects, IntegrityCheck, IntegrityScanEffects, PhysicalTime,
    PhysicalTimeEffects, RandomEffects, RiskLevel,
};
use acey_core::{AceyResult, CeremonyId};
use async_trait::async_trait;
use uuid::Uuid;

/// One handler per capability consumed by the unlock ceremony.
#[derive(Debug, Clone)]
pub struct CeremonyEffectSystem<T, R, B, D, I, A> {
    /// Physical clock
    pub time: T,
    /// Identifier source
    pub random: R,
    /// Biometric authenticator
    pub biometric: B,
    /// Desktop confirmation channel
    pub desktop: D,
    /// Integrity scanner
    pub integrity: I,
    /// Audit sink
    pub audit: A,
}

impl<B, D, I>
    CeremonyEffectSystem<RealTimeHandler, SystemRandomHandler, B, D, I, TracingAuditHandler>
{
    /// Real clock, OS randomness and tracing audit around the given
    /// capability handlers.
    pub fn production(biometric: B, desktop: D, integrity: I) -> Self {
        Self {
            time: RealTimeHandler::new(),
            random: SystemRandomHandler::new(),
            biometric,
            desktop,
            integrity,
            audit: TracingAuditHandler::new(),
        }
    }
}

#[async_trait]
impl<T, R, B, D, I, A> PhysicalTimeEffects for CeremonyEffectSystem<T, R, B, D, I, A>
where
    T: PhysicalTimeEffects,
    R: Send + Sync,
    B: Send + Sync,
    D: Send + Sync,
    I: Send + Sync,
    A: Send + Sync,
{
    async fn physical_time(&self) -> AceyResult<PhysicalTime> {
        self.time.physical_time().await
    }

    async fn sleep_ms(&self, ms: u64) -> AceyResult<()> {
        self.time.sleep_ms(ms).await
    }
}

#[async_trait]
impl<T, R, B, D, I, A> RandomEffects for CeremonyEffectSystem<T, R, B, D, I, A>
where
    T: Send + Sync,
    R: RandomEffects,
    B: Send + Sync,
    D: Send + Sync,
    I: Send + Sync,
    A: Send + Sync,
{
    async fn random_uuid(&self) -> AceyResult<Uuid> {
        self.random.random_uuid().await
    }
}

#[async_trait]
impl<T, R, B, D, I, A> BiometricEffects for CeremonyEffectSystem<T, R, B, D, I, A>
where
    T: Send + Sync,
    R: Send + Sync,
    B: BiometricEffects,
    D: Send + Sync,
    I: Send + Sync,
    A: Send + Sync,
{
    async fn authenticate(
        &self,
        purpose: &str,
        risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult> {
        self.biometric.authenticate(purpose, risk_level).await
    }
}

#[async_trait]
impl<T, R, B, D, I, A> DesktopConfirmationEffects for CeremonyEffectSystem<T, R, B, D, I, A>
where
    T: Send + Sync,
    R: Send + Sync,
    B: Send + Sync,
    D: DesktopConfirmationEffects,
    I: Send + Sync,
    A: Send + Sync,
{
    async fn await_confirmation(
        &self,
        ceremony_id: CeremonyId,
    ) -> AceyResult<DesktopConfirmation> {
        self.desktop.await_confirmation(ceremony_id).await
    }
}

#[async_trait]
impl<T, R, B, D, I, A> IntegrityScanEffects for CeremonyEffectSystem<T, R, B, D, I, A>
where
    T: Send + Sync,
    R: Send + Sync,
    B: Send + Sync,
    D: Send + Sync,
    I: IntegrityScanEffects,
    A: Send + Sync,
{
    async fn run_checks(&self, ceremony_id: CeremonyId) -> AceyResult<Vec<IntegrityCheck>> {
        self.integrity.run_checks(ceremony_id).await
    }
}

#[async_trait]
impl<T, R, B, D, I, A> AuditEffects for CeremonyEffectSystem<T, R, B, D, I, A>
where
    T: Send + Sync,
    R: Send + Sync,
    B: Send + Sync,
    D: Send + Sync,
    I: Send + Sync,
    A: AuditEffects,
{
    async fn append_audit_record(&self, record: AuditRecord) -> AceyResult<()> {
        self.audit.append_audit_record(record).await
    }
}
