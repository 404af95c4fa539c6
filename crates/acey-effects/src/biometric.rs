//! Fallback biometric handler for platforms without biometric hardware.
//!
//! Null-object implementation: every authentication attempt is rejected
//! with an explanatory error, so a ceremony started on a headless host fails
//! closed instead of hanging.

use acey_core::effects::{BiometricAuthResult, BiometricEffects, RiskLevel};
use acey_core::AceyResult;
use async_trait::async_trait;

/// Biometric handler that never authenticates.
#[derive(Debug, Clone)]
pub struct FallbackBiometricHandler {
    platform_config: String,
}

impl FallbackBiometricHandler {
    /// Create a new fallback biometric handler
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for FallbackBiometricHandler {
    fn default() -> Self {
        Self {
            platform_config: "fallback-no-hardware".to_string(),
        }
    }
}

#[async_trait]
impl BiometricEffects for FallbackBiometricHandler {
    async fn authenticate(
        &self,
        purpose: &str,
        risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult> {
        tracing::warn!(
            purpose,
            %risk_level,
            platform = %self.platform_config,
            "biometric authentication requested without hardware"
        );
        Ok(BiometricAuthResult::rejected(
            "Biometric authentication not available on this platform handler",
        ))
    }
}
