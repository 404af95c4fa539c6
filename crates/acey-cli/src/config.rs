//! CLI configuration file.

use acey_unlock::UnlockCeremonyConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Contents of `.acey/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Settings for real ceremonies
    pub ceremony: UnlockCeremonyConfig,
    /// Log output
    pub logging: LoggingConfig,
    /// Settings for rehearsals
    pub drill: DrillConfig,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `--verbose` is not given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// `[drill]` section: compressed timings so a rehearsal finishes quickly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrillConfig {
    /// Drill deadline (ms)
    pub ceremony_timeout_ms: u64,
    /// Drill time delay (ms)
    pub time_delay_ms: u64,
    /// Drill rehydration wait (ms)
    pub rehydration_ms: u64,
    /// Drill scheduler tick (ms)
    pub tick_interval_ms: u64,
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            ceremony_timeout_ms: 30_000,
            time_delay_ms: 3_000,
            rehydration_ms: 1_000,
            tick_interval_ms: 250,
        }
    }
}

impl CliConfig {
    /// Ceremony configuration for a drill.
    pub fn drill_ceremony(&self) -> UnlockCeremonyConfig {
        UnlockCeremonyConfig {
            ceremony_timeout_ms: self.drill.ceremony_timeout_ms,
            time_delay_ms: self.drill.time_delay_ms,
            rehydration_ms: self.drill.rehydration_ms,
            tick_interval_ms: self.drill.tick_interval_ms,
            biometric_purpose: self.ceremony.biometric_purpose.clone(),
        }
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration")
    }
}

/// Load configuration; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: CliConfig = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .ceremony
        .validate()
        .with_context(|| format!("Invalid [ceremony] section in {}", path.display()))?;
    config
        .drill_ceremony()
        .validate()
        .with_context(|| format!("Invalid [drill] section in {}", path.display()))?;
    Ok(config)
}
