//! Trade count → tariff credit conversion

use crate::errors::{Result, TariffError};
use crate::types::Count;
use scalar_types::RATE_SCALE;
use serde::{Deserialize, Serialize};

/// Pure conversion from cumulative trades to cumulative credits.
///
/// Credits are always recomputed from the absolute trade count, never
/// accumulated, so evaluating the same count twice yields the same result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCalculator {
    tariff_rate: u128,
    trades_per_credit: u64,
}

impl RateCalculator {
    pub fn new(tariff_rate: u128) -> Result<Self> {
        if tariff_rate == 0 {
            return Err(TariffError::InvalidConfig("tariff rate must be positive"));
        }
        if tariff_rate > RATE_SCALE {
            return Err(TariffError::InvalidConfig(
                "tariff rate cannot exceed RATE_SCALE",
            ));
        }

        // RATE_SCALE / 1 = 10^18 still fits in u64.
        let trades_per_credit = u64::try_from(RATE_SCALE / tariff_rate)
            .map_err(|_| TariffError::ArithmeticOverflow("trades per credit"))?;

        Ok(Self {
            tariff_rate,
            trades_per_credit,
        })
    }

    pub fn tariff_rate(&self) -> u128 {
        self.tariff_rate
    }

    /// Trades needed to earn one credit (integer division, at least 1).
    pub fn trades_per_credit(&self) -> u64 {
        self.trades_per_credit
    }

    /// Cumulative credits for a cumulative trade count (floor division).
    pub fn credits_for(&self, trade_count: Count) -> Count {
        trade_count / self.trades_per_credit
    }

    /// Trades still missing before the next credit is earned.
    pub fn trades_until_next_credit(&self, trade_count: Count) -> Count {
        self.trades_per_credit - (trade_count % self.trades_per_credit)
    }
}
