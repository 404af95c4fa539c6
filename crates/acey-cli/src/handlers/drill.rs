//! `acey drill`: non-interactive rehearsal with scripted answers.

use super::simulated::{FixedBiometric, FixedDesktop, SimulatedIntegrityScanner};
use crate::config::CliConfig;
use acey_effects::CeremonyEffectSystem;
use acey_unlock::UnlockCeremony;
use anyhow::Result;
use clap::Args;

/// Drill options
#[derive(Debug, Clone, Args)]
pub struct DrillArgs {
    /// Reason recorded for the rehearsal
    #[arg(short, long)]
    pub reason: String,

    /// Make the biometric step fail
    #[arg(long)]
    pub reject_biometric: bool,

    /// Make the desktop peer deny the unlock
    #[arg(long)]
    pub deny_desktop: bool,

    /// Integrity check to report as failed (repeatable)
    #[arg(long = "fail-check", value_name = "NAME")]
    pub fail_checks: Vec<String>,
}

/// Run a rehearsal with drill timings.
pub async fn handle_drill(config: &CliConfig, args: DrillArgs) -> Result<i32> {
    let effects = CeremonyEffectSystem::production(
        FixedBiometric {
            accept: !args.reject_biometric,
        },
        FixedDesktop {
            confirm: !args.deny_desktop,
        },
        SimulatedIntegrityScanner::new(args.fail_checks),
    );
    let ceremony = UnlockCeremony::new(effects, config.drill_ceremony())?;
    super::run_ceremony(ceremony, &args.reason).await
}
