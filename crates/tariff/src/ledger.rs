//! Tariff credit ledger

use crate::errors::{Result, TariffError};
use crate::rate::RateCalculator;
use crate::types::{Count, Pool};
use serde::{Deserialize, Serialize};

/// Earned and redeemed tariff credits.
///
/// `credits_earned` is a cache of `RateCalculator::credits_for(trade_count)`,
/// refreshed by [`TariffLedger::sync`]. `credits_redeemed` only moves through
/// [`TariffLedger::redeem`] / [`TariffLedger::commit_redeem`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffLedger {
    credits_earned: Count,
    credits_redeemed: Count,
}

impl TariffLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(credits_earned: Count, credits_redeemed: Count) -> Self {
        Self {
            credits_earned,
            credits_redeemed,
        }
    }

    /// Recompute earned credits from the absolute trade count. Returns the
    /// number of credits newly earned by this call.
    pub fn sync(&mut self, trade_count: Count, rate: &RateCalculator) -> Count {
        let earned = rate.credits_for(trade_count);
        // Trade count never decreases, so neither does the step function.
        let gained = earned.saturating_sub(self.credits_earned);
        self.credits_earned = self.credits_earned.max(earned);
        gained
    }

    pub fn credits_earned(&self) -> Count {
        self.credits_earned
    }

    pub fn credits_redeemed(&self) -> Count {
        self.credits_redeemed
    }

    pub fn remaining_credits(&self) -> Count {
        self.credits_earned - self.credits_redeemed
    }

    /// Validate a redemption and return the resulting redeemed total without
    /// applying it.
    pub fn check_redeem(&self, count: Count) -> Result<Count> {
        if count == 0 {
            return Err(TariffError::InvalidCount);
        }

        match self.credits_redeemed.checked_add(count) {
            Some(next) if next <= self.credits_earned => Ok(next),
            _ => Err(TariffError::CapacityExceeded {
                pool: Pool::Tariff,
                requested: count,
                remaining: self.remaining_credits(),
            }),
        }
    }

    /// Apply a total previously returned by [`TariffLedger::check_redeem`]
    /// while `credits_redeemed` was `base`.
    pub(crate) fn commit_redeem(&mut self, base: Count, next_redeemed: Count) -> Result<()> {
        if base != self.credits_redeemed
            || next_redeemed < base
            || next_redeemed > self.credits_earned
        {
            return Err(TariffError::StalePlan {
                pool: Pool::Tariff,
                planned_from: base,
                current: self.credits_redeemed,
            });
        }
        self.credits_redeemed = next_redeemed;
        Ok(())
    }

    pub fn redeem(&mut self, count: Count) -> Result<()> {
        let next = self.check_redeem(count)?;
        self.commit_redeem(self.credits_redeemed, next)
    }
}
