//! Fixed-answer capabilities for the integrity battery and drills.

use acey_core::effects::{
    BiometricAuthResult, BiometricEffects, DesktopConfirmation, DesktopConfirmationEffects,
    IntegrityCheck, IntegrityScanEffects, RiskLevel, STANDARD_INTEGRITY_BATTERY,
};
use acey_core::{AceyResult, CeremonyId};
use async_trait::async_trait;
use tracing::debug;

/// Runs the standard battery, failing the named checks.
#[derive(Debug, Clone, Default)]
pub struct SimulatedIntegrityScanner {
    failing: Vec<String>,
}

impl SimulatedIntegrityScanner {
    /// Scanner that reports `failing` as failed checks.
    pub fn new(failing: Vec<String>) -> Self {
        Self { failing }
    }
}

#[async_trait]
impl IntegrityScanEffects for SimulatedIntegrityScanner {
    async fn run_checks(&self, ceremony_id: CeremonyId) -> AceyResult<Vec<IntegrityCheck>> {
        debug!(ceremony_id = %ceremony_id, failing = ?self.failing, "Running simulated integrity battery");
        Ok(STANDARD_INTEGRITY_BATTERY
            .iter()
            .map(|name| {
                if self.failing.iter().any(|f| f == name) {
                    IntegrityCheck::fail(*name, "simulated failure")
                } else {
                    IntegrityCheck::pass(*name, "simulated pass")
                }
            })
            .collect())
    }
}

/// Biometric step with a predetermined verdict.
#[derive(Debug, Clone)]
pub struct FixedBiometric {
    /// Verdict returned for every attempt
    pub accept: bool,
}

#[async_trait]
impl BiometricEffects for FixedBiometric {
    async fn authenticate(
        &self,
        _purpose: &str,
        _risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult> {
        if self.accept {
            Ok(BiometricAuthResult::accepted())
        } else {
            Ok(BiometricAuthResult::rejected("drill: biometric rejected"))
        }
    }
}

/// Desktop peer with a predetermined answer.
#[derive(Debug, Clone)]
pub struct FixedDesktop {
    /// Answer returned for every request
    pub confirm: bool,
}

#[async_trait]
impl DesktopConfirmationEffects for FixedDesktop {
    async fn await_confirmation(&self, _: CeremonyId) -> AceyResult<DesktopConfirmation> {
        Ok(DesktopConfirmation {
            confirmed: self.confirm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acey_core::effects::integrity::RULE_VALIDATION;
    use acey_core::effects::RandomEffects;
    use acey_effects::SystemRandomHandler;

    #[tokio::test]
    async fn test_simulated_battery_fails_named_checks() {
        let id = CeremonyId::from_uuid(SystemRandomHandler::new().random_uuid().await.unwrap());
        let scanner = SimulatedIntegrityScanner::new(vec![RULE_VALIDATION.to_string()]);
        let checks = scanner.run_checks(id).await.unwrap();
        assert_eq!(checks.len(), 4);
        let failed: Vec<_> = checks.iter().filter(|c| !c.passed).map(|c| c.name.as_str()).collect();
        assert_eq!(failed, vec![RULE_VALIDATION]);
    }
}
