//! `acey unlock`: a real ceremony with the operator at the terminal.

use super::console::{ConsoleBiometric, ConsoleDesktop};
use super::simulated::SimulatedIntegrityScanner;
use crate::config::CliConfig;
use acey_core::effects::BiometricEffects;
use acey_effects::{CeremonyEffectSystem, FallbackBiometricHandler};
use acey_unlock::UnlockCeremony;
use anyhow::Result;
use std::io::IsTerminal;
use std::sync::Arc;
use tracing::warn;

/// Run an interactive ceremony.
///
/// Without a terminal on stdin there is no one to present the biometric,
/// so the fallback handler rejects it and the ceremony fails.
pub async fn handle_unlock(config: &CliConfig, reason: &str, fail_checks: Vec<String>) -> Result<i32> {
    let biometric: Arc<dyn BiometricEffects> = if std::io::stdin().is_terminal() {
        Arc::new(ConsoleBiometric)
    } else {
        warn!("stdin is not a terminal; biometric step will be rejected");
        Arc::new(FallbackBiometricHandler::new())
    };

    let effects = CeremonyEffectSystem::production(
        biometric,
        ConsoleDesktop,
        SimulatedIntegrityScanner::new(fail_checks),
    );
    let ceremony = UnlockCeremony::new(effects, config.ceremony.clone())?;
    super::run_ceremony(ceremony, reason).await
}
