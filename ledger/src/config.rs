//! Ledger configuration (ledger.toml) support
//!
//! Example:
//! ```toml
//! cycle_period = 86400
//! cycle_length = 3600
//! bond_amount = 100
//! base_asset_label = "MYNT"
//! token_asset_label = "tokens"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{LedgerError, Result};
use crate::types::{Amount, Timestamp};

/// Default cycle: one day
pub const DEFAULT_CYCLE_PERIOD: Timestamp = 24 * 60 * 60;

/// Default calibration window: the first hour of each cycle
pub const DEFAULT_CYCLE_LENGTH: Timestamp = 60 * 60;

pub const DEFAULT_BOND_AMOUNT: Amount = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Length of a cycle in seconds
    pub cycle_period: Timestamp,

    /// Length of the calibration window opening each cycle, in seconds
    pub cycle_length: Timestamp,

    /// Initializer's own deposit
    pub bond_amount: Amount,

    /// Name of the deposited asset, used in reason messages
    pub base_asset_label: String,

    /// Name of external reward tokens, used in reason messages
    pub token_asset_label: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            cycle_period: DEFAULT_CYCLE_PERIOD,
            cycle_length: DEFAULT_CYCLE_LENGTH,
            bond_amount: DEFAULT_BOND_AMOUNT,
            base_asset_label: "MYNT".to_string(),
            token_asset_label: "tokens".to_string(),
        }
    }
}

impl LedgerConfig {
    pub fn new(cycle_period: Timestamp, cycle_length: Timestamp, bond_amount: Amount) -> Self {
        Self {
            cycle_period,
            cycle_length,
            bond_amount,
            ..Self::default()
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| LedgerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            LedgerError::Config(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Validate the cycle schedule
    pub fn validate(&self) -> Result<()> {
        if self.cycle_period == 0 {
            return Err(LedgerError::InvalidConfig(
                "cycle_period must be positive".to_string(),
            ));
        }
        if self.cycle_length == 0 {
            return Err(LedgerError::InvalidConfig(
                "cycle_length must be positive".to_string(),
            ));
        }
        if self.cycle_length > self.cycle_period {
            log::warn!(
                "cycle_length {} exceeds cycle_period {}: calibration window never closes",
                self.cycle_length,
                self.cycle_period
            );
        }
        Ok(())
    }
}
