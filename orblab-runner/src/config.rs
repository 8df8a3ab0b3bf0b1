//! Serializable run configuration.

use orblab_core::{AccountConfig, GateConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Unique identifier for a run (content-addressable hash).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete configuration for a single backtest run.
///
/// Every field has a default, so an empty TOML file is a valid config.
/// Two runs with identical configs share a [`RunId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    pub gate: GateConfig,
    pub account: AccountConfig,
}

impl RunConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if self.account.starting_balance <= 0.0 {
            return invalid("account.starting_balance must be positive");
        }
        if self.account.risk_per_trade <= 0.0 || self.account.risk_per_trade > 1.0 {
            return invalid("account.risk_per_trade must be in (0, 1]");
        }
        if self.account.point_value <= 0.0 {
            return invalid("account.point_value must be positive");
        }
        if self.gate.stop_buffer_points < 0.0 {
            return invalid("gate.stop_buffer_points must not be negative");
        }
        if self.gate.max_orb_pct <= 0.0 {
            return invalid("gate.max_orb_pct must be positive");
        }
        if self.gate.max_liq_distance_pct <= 0.0 {
            return invalid("gate.max_liq_distance_pct must be positive");
        }
        Ok(())
    }

    /// Deterministic hash of the configuration, for naming run artifacts and
    /// deduplicating repeated runs.
    pub fn run_id(&self) -> RunId {
        let json = serde_json::to_string(self).expect("RunConfig serialization failed");
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orblab_core::ContextPolicy;

    #[test]
    fn empty_toml_is_the_default_config() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config, RunConfig::default());
        assert_eq!(config.gate.policy, ContextPolicy::Soft);
        assert_eq!(config.account.starting_balance, 10_000.0);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let config = RunConfig::from_toml_str(
            r#"
            [gate]
            policy = "strict"
            min_1h_strength = 40

            [account]
            risk_per_trade = 0.02
            "#,
        )
        .unwrap();
        assert_eq!(config.gate.policy, ContextPolicy::Strict);
        assert_eq!(config.gate.min_1h_strength, 40);
        assert_eq!(config.gate.stop_buffer_points, 5.0);
        assert_eq!(config.account.risk_per_trade, 0.02);
        assert_eq!(config.account.point_value, 1.0);
    }

    #[test]
    fn out_of_range_risk_is_rejected() {
        let err = RunConfig::from_toml_str("[account]\nrisk_per_trade = 1.5\n").unwrap_err();
        assert!(err.to_string().contains("risk_per_trade"));
    }

    #[test]
    fn negative_stop_buffer_is_rejected() {
        let err = RunConfig::from_toml_str("[gate]\nstop_buffer_points = -1.0\n").unwrap_err();
        assert!(err.to_string().contains("stop_buffer_points"));
    }

    #[test]
    fn run_id_is_stable_and_config_sensitive() {
        let a = RunConfig::default();
        let mut b = RunConfig::default();
        assert_eq!(a.run_id(), b.run_id());
        b.account.risk_per_trade = 0.02;
        assert_ne!(a.run_id(), b.run_id());
    }
}
