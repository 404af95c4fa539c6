//! Scripted integrity scanner.

use acey_core::effects::{IntegrityCheck, IntegrityScanEffects, STANDARD_INTEGRITY_BATTERY};
use acey_core::{AceyError, AceyResult, CeremonyId};
use async_trait::async_trait;
use parking_lot::Mutex;

/// Returns a configured battery; defaults to the standard battery with
/// every check passing.
#[derive(Debug)]
pub struct ScriptedIntegrityScanner {
    response: Mutex<AceyResult<Vec<IntegrityCheck>>>,
    calls: Mutex<Vec<CeremonyId>>,
}

impl ScriptedIntegrityScanner {
    /// All standard checks pass
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Ok(standard_battery(&[]))),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Standard battery with the named checks failing
    pub fn fail_checks(&self, failing: &[&str]) {
        *self.response.lock() = Ok(standard_battery(failing));
    }

    /// Return exactly `checks`
    pub fn respond_with(&self, checks: Vec<IntegrityCheck>) {
        *self.response.lock() = Ok(checks);
    }

    /// Return an error
    pub fn fail_with(&self, error: AceyError) {
        *self.response.lock() = Err(error);
    }

    /// Ceremonies that were scanned
    pub fn calls(&self) -> Vec<CeremonyId> {
        self.calls.lock().clone()
    }
}

impl Default for ScriptedIntegrityScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// The standard four checks, with `failing` reported as failed.
pub fn standard_battery(failing: &[&str]) -> Vec<IntegrityCheck> {
    STANDARD_INTEGRITY_BATTERY
        .iter()
        .map(|name| {
            if failing.contains(name) {
                IntegrityCheck::fail(*name, format!("{name} check failed"))
            } else {
                IntegrityCheck::pass(*name, format!("{name} check passed"))
            }
        })
        .collect()
}

#[async_trait]
impl IntegrityScanEffects for ScriptedIntegrityScanner {
    async fn run_checks(&self, ceremony_id: CeremonyId) -> AceyResult<Vec<IntegrityCheck>> {
        self.calls.lock().push(ceremony_id);
        self.response.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acey_core::effects::integrity::DATABASE_SCHEMA;

    #[test]
    fn test_standard_battery_marks_failures() {
        let checks = standard_battery(&[DATABASE_SCHEMA]);
        assert_eq!(checks.len(), 4);
        assert_eq!(checks.iter().filter(|c| !c.passed).count(), 1);
        assert!(!checks[3].passed);
    }
}
