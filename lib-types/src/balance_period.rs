//! Balance Period Clock
//!
//! Maps a timestamp onto the settlement window that contains it.
//!
//! period = floor((t - offset) / length) * length + offset
//!
//! Windows are half-open: `[period, period + length)`. Timestamps before
//! `offset` belong to period 0.

use serde::{Deserialize, Serialize};

use crate::primitives::{BalancePeriod, Timestamp};

/// Default settlement window length in seconds (15 minutes)
pub const DEFAULT_BALANCE_PERIOD_LENGTH: u64 = 900;

/// Default window offset in seconds
pub const DEFAULT_BALANCE_PERIOD_OFFSET: u64 = 1;

/// Network-wide balance period parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancePeriodConfig {
    /// Window length in seconds (must be > 0)
    pub length: u64,
    /// Offset of window starts from multiples of `length`
    pub offset: u64,
}

impl Default for BalancePeriodConfig {
    fn default() -> Self {
        Self {
            length: DEFAULT_BALANCE_PERIOD_LENGTH,
            offset: DEFAULT_BALANCE_PERIOD_OFFSET,
        }
    }
}

impl BalancePeriodConfig {
    /// Balance period containing `timestamp`
    pub fn balance_period(&self, timestamp: Timestamp) -> BalancePeriod {
        if self.length == 0 || timestamp < self.offset {
            return 0;
        }
        (timestamp - self.offset) / self.length * self.length + self.offset
    }

    /// First timestamp after the window starting at `period`
    pub fn period_end(&self, period: BalancePeriod) -> Timestamp {
        period.saturating_add(self.length)
    }

    /// Whether `timestamp` falls inside the window starting at `period`
    pub fn contains(&self, period: BalancePeriod, timestamp: Timestamp) -> bool {
        timestamp >= period && timestamp < self.period_end(period)
    }

    /// Whether `period` is a canonical window start
    pub fn is_period_start(&self, period: BalancePeriod) -> bool {
        period >= self.offset && self.balance_period(period) == period
    }
}

/// Free-function form of [`BalancePeriodConfig::balance_period`]
pub fn get_balance_period(config: &BalancePeriodConfig, timestamp: Timestamp) -> BalancePeriod {
    config.balance_period(timestamp)
}
