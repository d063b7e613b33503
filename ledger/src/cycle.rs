//! Cycle schedule
//!
//! Time is split into cycles of `cycle_period` seconds counted from the
//! epoch. The first `cycle_length` seconds of every cycle form the
//! calibration window.

use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleClock {
    cycle_period: Timestamp,
    cycle_length: Timestamp,
}

impl CycleClock {
    pub fn new(cycle_period: Timestamp, cycle_length: Timestamp) -> Result<Self> {
        if cycle_period == 0 || cycle_length == 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "cycle period and length must be positive (period {}, length {})",
                cycle_period, cycle_length
            )));
        }
        Ok(Self {
            cycle_period,
            cycle_length,
        })
    }

    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.cycle_period, config.cycle_length)
    }

    pub fn cycle_period(&self) -> Timestamp {
        self.cycle_period
    }

    pub fn cycle_length(&self) -> Timestamp {
        self.cycle_length
    }

    pub fn cycle_index(&self, now: Timestamp) -> u64 {
        now / self.cycle_period
    }

    /// Whether `now` falls inside the calibration window
    pub fn is_open(&self, now: Timestamp) -> bool {
        now % self.cycle_period < self.cycle_length
    }

    /// Start of the cycle preceding the one containing `now`.
    ///
    /// `None` during cycle 0, which has no predecessor.
    pub fn previous_cycle_start(&self, now: Timestamp) -> Option<Timestamp> {
        self.cycle_index(now)
            .checked_sub(1)
            .map(|index| index * self.cycle_period)
    }

    pub fn cycle_start(&self, now: Timestamp) -> Timestamp {
        self.cycle_index(now) * self.cycle_period
    }

    /// Seconds until the next calibration window opens, zero while open
    pub fn seconds_until_open(&self, now: Timestamp) -> Timestamp {
        if self.is_open(now) {
            0
        } else {
            self.cycle_start(now) + self.cycle_period - now
        }
    }
}
