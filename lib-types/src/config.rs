//! Network-wide ledger configuration
//!
//! Loaded from TOML. Every field has a default so an empty file is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::balance_period::BalancePeriodConfig;

/// Three 30-day months
pub const DEFAULT_DOCUMENTATION_WINDOW_SECS: u64 = 3 * 30 * 24 * 3600;

/// Ledger units per watt-hour (1 unit = 1 mWh)
pub const DEFAULT_UNITS_PER_WATT_HOUR: u64 = 1_000;

/// Maximum identities a relayed call may pass through
pub const DEFAULT_MAX_RELAY_HOPS: u8 = 8;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Network-wide ledger settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Settlement window parameters
    pub balance_period: BalancePeriodConfig,
    /// Ledger units per watt-hour of energy
    pub units_per_watt_hour: u64,
    /// How long after a period ends its documentation may still be corrected
    pub documentation_window_secs: u64,
    /// Upper bound on act-as relay chains
    pub max_relay_hops: u8,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            balance_period: BalancePeriodConfig::default(),
            units_per_watt_hour: DEFAULT_UNITS_PER_WATT_HOUR,
            documentation_window_secs: DEFAULT_DOCUMENTATION_WINDOW_SECS,
            max_relay_hops: DEFAULT_MAX_RELAY_HOPS,
        }
    }
}

impl LedgerConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.balance_period.length == 0 {
            return Err(ConfigError::Invalid("balance_period.length must be > 0".into()));
        }
        if self.balance_period.offset >= self.balance_period.length {
            return Err(ConfigError::Invalid(
                "balance_period.offset must be smaller than balance_period.length".into(),
            ));
        }
        if self.units_per_watt_hour == 0 {
            return Err(ConfigError::Invalid("units_per_watt_hour must be > 0".into()));
        }
        if self.max_relay_hops == 0 {
            return Err(ConfigError::Invalid("max_relay_hops must be > 0".into()));
        }
        Ok(())
    }

    /// Energy cap in ledger units for a plant of `capacity_watts` over one
    /// balance period
    pub fn energy_cap(&self, capacity_watts: u128) -> Option<u128> {
        capacity_watts
            .checked_mul(self.balance_period.length as u128)?
            .checked_mul(self.units_per_watt_hour as u128)
            .map(|v| v / 3600)
    }
}
