//! Scripted biometric authenticator.

use acey_core::effects::{BiometricAuthResult, BiometricEffects, RiskLevel};
use acey_core::{AceyError, AceyResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::watch;

/// Answers from a queue, accepting once the queue is empty.
///
/// `hold()` parks every call until `release()`, which lets a test decide
/// exactly when the verdict arrives relative to the clock.
#[derive(Debug)]
pub struct ScriptedBiometric {
    outcomes: Mutex<VecDeque<AceyResult<BiometricAuthResult>>>,
    calls: Mutex<Vec<(String, RiskLevel)>>,
    held: watch::Sender<bool>,
}

impl ScriptedBiometric {
    /// Accept every call
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            held: watch::channel(false).0,
        }
    }

    /// Queue a rejection
    pub fn reject_next(&self, reason: &str) {
        self.outcomes
            .lock()
            .push_back(Ok(BiometricAuthResult::rejected(reason)));
    }

    /// Queue an acceptance
    pub fn accept_next(&self) {
        self.outcomes
            .lock()
            .push_back(Ok(BiometricAuthResult::accepted()));
    }

    /// Queue an error
    pub fn fail_next(&self, error: AceyError) {
        self.outcomes.lock().push_back(Err(error));
    }

    /// Park calls until [`Self::release`]
    pub fn hold(&self) {
        self.held.send_replace(true);
    }

    /// Let parked calls answer
    pub fn release(&self) {
        self.held.send_replace(false);
    }

    /// `(purpose, risk_level)` of every call so far
    pub fn calls(&self) -> Vec<(String, RiskLevel)> {
        self.calls.lock().clone()
    }
}

impl Default for ScriptedBiometric {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BiometricEffects for ScriptedBiometric {
    async fn authenticate(
        &self,
        purpose: &str,
        risk_level: RiskLevel,
    ) -> AceyResult<BiometricAuthResult> {
        self.calls.lock().push((purpose.to_string(), risk_level));

        let mut rx = self.held.subscribe();
        loop {
            let held = *rx.borrow_and_update();
            if !held {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }

        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(BiometricAuthResult::accepted()))
    }
}
