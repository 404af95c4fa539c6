//! Ceremony test fixture.

use crate::{
    DeterministicRandom, GatedDesktop, ManualClock, RecordingAudit, ScriptedBiometric,
    ScriptedIntegrityScanner,
};
use acey_effects::CeremonyEffectSystem;
use std::sync::Arc;

/// Effect system built from the testkit handlers.
pub type MockCeremonyEffects = CeremonyEffectSystem<
    Arc<ManualClock>,
    Arc<DeterministicRandom>,
    Arc<ScriptedBiometric>,
    Arc<GatedDesktop>,
    Arc<ScriptedIntegrityScanner>,
    Arc<RecordingAudit>,
>;

/// Shared handles to every mock handler.
///
/// Defaults: clock at [`crate::DEFAULT_START_MS`], biometric accepts,
/// desktop blocks until told, integrity battery passes, audit records.
#[derive(Debug, Clone, Default)]
pub struct CeremonyHarness {
    /// Manual clock
    pub clock: Arc<ManualClock>,
    /// Identifier source
    pub random: Arc<DeterministicRandom>,
    /// Biometric authenticator
    pub biometric: Arc<ScriptedBiometric>,
    /// Desktop channel
    pub desktop: Arc<GatedDesktop>,
    /// Integrity scanner
    pub integrity: Arc<ScriptedIntegrityScanner>,
    /// Audit sink
    pub audit: Arc<RecordingAudit>,
}

impl CeremonyHarness {
    /// Fresh handlers with default behaviour
    pub fn new() -> Self {
        Self::default()
    }

    /// Effect system sharing this harness's handlers
    pub fn effects(&self) -> MockCeremonyEffects {
        CeremonyEffectSystem {
            time: self.clock.clone(),
            random: self.random.clone(),
            biometric: self.biometric.clone(),
            desktop: self.desktop.clone(),
            integrity: self.integrity.clone(),
            audit: self.audit.clone(),
        }
    }
}
