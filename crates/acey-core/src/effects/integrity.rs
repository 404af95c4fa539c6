//! System integrity scan effects.
//!
//! The scanner runs a fixed, caller-agnostic battery of named checks against
//! the protected system. The ceremony only aggregates the verdicts.

use crate::{AceyResult, CeremonyId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Memory corruption check name
pub const MEMORY_CORRUPTION: &str = "memory_corruption";
/// Rule validation check name
pub const RULE_VALIDATION: &str = "rule_validation";
/// Trust graph integrity check name
pub const TRUST_GRAPH_INTEGRITY: &str = "trust_graph_integrity";
/// Database schema check name
pub const DATABASE_SCHEMA: &str = "database_schema";

/// Names of the standard integrity battery, in execution order.
pub const STANDARD_INTEGRITY_BATTERY: [&str; 4] = [
    MEMORY_CORRUPTION,
    RULE_VALIDATION,
    TRUST_GRAPH_INTEGRITY,
    DATABASE_SCHEMA,
];

/// Outcome of one named integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityCheck {
    /// Identifier of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable explanation
    pub details: String,
}

impl IntegrityCheck {
    /// A passing check.
    pub fn pass(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            details: details.into(),
        }
    }

    /// A failing check.
    pub fn fail(name: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            details: details.into(),
        }
    }
}

/// Integrity scanner interface.
#[async_trait]
pub trait IntegrityScanEffects: Send + Sync {
    /// Run the full battery for `ceremony_id` and report every check.
    async fn run_checks(&self, ceremony_id: CeremonyId) -> AceyResult<Vec<IntegrityCheck>>;
}

#[async_trait]
impl<T: IntegrityScanEffects + ?Sized> IntegrityScanEffects for std::sync::Arc<T> {
    async fn run_checks(&self, ceremony_id: CeremonyId) -> AceyResult<Vec<IntegrityCheck>> {
        (**self).run_checks(ceremony_id).await
    }
}
