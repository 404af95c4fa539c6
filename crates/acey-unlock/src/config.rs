//! Ceremony configuration.

use crate::errors::UnlockError;
use serde::{Deserialize, Serialize};

/// Default ceremony-wide deadline: 5 minutes.
pub const DEFAULT_CEREMONY_TIMEOUT_MS: u64 = 5 * 60 * 1000;
/// Default mandatory delay after biometric success: 60 seconds.
pub const DEFAULT_TIME_DELAY_MS: u64 = 60 * 1000;
/// Default bounded rehydration wait: 10 seconds.
pub const DEFAULT_REHYDRATION_MS: u64 = 10 * 1000;
/// Default scheduler tick: 1 second.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
/// Default purpose string shown by the biometric prompt.
pub const DEFAULT_BIOMETRIC_PURPOSE: &str = "secure unlock ceremony";

/// Configuration for unlock ceremonies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockCeremonyConfig {
    /// Hard deadline measured from creation (ms)
    pub ceremony_timeout_ms: u64,
    /// Countdown that must elapse after biometric success (ms)
    pub time_delay_ms: u64,
    /// Bounded wait between passing integrity checks and completion (ms)
    pub rehydration_ms: u64,
    /// How often the scheduler checks expiry and due wakes (ms)
    pub tick_interval_ms: u64,
    /// Purpose passed to the biometric authenticator
    pub biometric_purpose: String,
}

impl Default for UnlockCeremonyConfig {
    fn default() -> Self {
        Self {
            ceremony_timeout_ms: DEFAULT_CEREMONY_TIMEOUT_MS,
            time_delay_ms: DEFAULT_TIME_DELAY_MS,
            rehydration_ms: DEFAULT_REHYDRATION_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            biometric_purpose: DEFAULT_BIOMETRIC_PURPOSE.to_string(),
        }
    }
}

impl UnlockCeremonyConfig {
    /// Check that the timed stages fit inside the ceremony window.
    pub fn validate(&self) -> Result<(), UnlockError> {
        if self.ceremony_timeout_ms == 0 {
            return Err(UnlockError::invalid_config(
                "ceremony_timeout_ms must be greater than zero",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(UnlockError::invalid_config(
                "tick_interval_ms must be greater than zero",
            ));
        }
        let timed = self.time_delay_ms.saturating_add(self.rehydration_ms);
        if timed >= self.ceremony_timeout_ms {
            return Err(UnlockError::invalid_config(format!(
                "time_delay_ms + rehydration_ms ({timed}) must be shorter than ceremony_timeout_ms ({})",
                self.ceremony_timeout_ms
            )));
        }
        if self.biometric_purpose.trim().is_empty() {
            return Err(UnlockError::invalid_config(
                "biometric_purpose must not be empty",
            ));
        }
        Ok(())
    }

    /// Stage timings consumed by the transition function.
    pub fn timings(&self) -> StageTimings {
        StageTimings {
            time_delay_ms: self.time_delay_ms,
            rehydration_ms: self.rehydration_ms,
        }
    }
}

/// Durations of the two timed stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimings {
    /// Length of `TimeDelayPending`
    pub time_delay_ms: u64,
    /// Length of `RehydrationPending`
    pub rehydration_ms: u64,
}

impl Default for StageTimings {
    fn default() -> Self {
        UnlockCeremonyConfig::default().timings()
    }
}
