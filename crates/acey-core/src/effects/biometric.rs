//! Biometric Authentication Effects Trait Definitions
//!
//! The ceremony consumes biometric authentication as an opaque capability:
//! it names a purpose and a risk classification and receives a
//! success/failure verdict. How the sensor works is the handler's concern.
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `acey-effects` (fallback), platform crates (hardware)
//! - **Usage**: First stage of the unlock ceremony

use crate::AceyResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Risk classification passed to the authenticator.
///
/// Ordered from least to most sensitive, so `RiskLevel::Critical` is the
/// maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Routine operation
    Low,
    /// Moderately sensitive operation
    Medium,
    /// Sensitive operation
    High,
    /// Operation that restores or removes protection from the whole system
    Critical,
}

impl RiskLevel {
    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict returned by the authenticator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricAuthResult {
    /// Whether the user was authenticated
    pub success: bool,
    /// Explanation when authentication did not succeed
    pub error: Option<String>,
}

impl BiometricAuthResult {
    /// Successful authentication.
    pub fn accepted() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Rejected authentication with a reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Biometric effects interface
///
/// Implementations prompt the user (sensor, OS dialog, console) and report
/// whether authentication succeeded. An `Err` means the capability itself
/// could not be used, which the ceremony records as a failure rather than a
/// rejection.
#[async_trait]
pub trait BiometricEffects: Send + Sync {
    /// Authenticate the user for `purpose` at the given risk level.
    async fn authenticate(
        &self,
        purpose: &str,
        risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult>;
}

#[async_trait]
impl<T: BiometricEffects + ?Sized> BiometricEffects for std::sync::Arc<T> {
    async fn authenticate(
        &self,
        purpose: &str,
        risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult> {
        (**self).authenticate(purpose, risk_level).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }

    #[test]
    fn test_risk_level_wire_names() {
        assert_eq!(RiskLevel::Critical.to_string(), "CRITICAL");
        assert_eq!(RiskLevel::Low.as_str(), "LOW");
    }

    #[test]
    fn test_result_constructors() {
        assert!(BiometricAuthResult::accepted().success);
        let rejected = BiometricAuthResult::rejected("no match");
        assert!(!rejected.success);
        assert_eq!(rejected.error.as_deref(), Some("no match"));
    }
}
