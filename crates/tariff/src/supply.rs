//! Supply tracking across the public and tariff pools
//!
//! Single source of truth for issued items. The two pools are
//! capacity-independent: the public cap is never consulted for tariff
//! issuance, so the total may exceed the public cap.

use crate::errors::{Result, TariffError};
use crate::ledger::TariffLedger;
use crate::rate::RateCalculator;
use crate::types::{Count, Pool};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A validated, not yet applied, pool increment. Only valid against the
/// counter value it was planned from.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an issue plan does nothing until committed"]
pub(crate) struct IssuePlan {
    pub pool: Pool,
    pub count: Count,
    base_value: Count,
    next_value: Count,
}

/// Issued counters for both pools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyLedger {
    public_cap: Count,
    public_issued: Count,
    tariff: TariffLedger,
}

impl SupplyLedger {
    pub fn new(public_cap: Count) -> Self {
        Self {
            public_cap,
            public_issued: 0,
            tariff: TariffLedger::new(),
        }
    }

    pub(crate) fn from_parts(public_cap: Count, public_issued: Count, tariff: TariffLedger) -> Self {
        Self {
            public_cap,
            public_issued,
            tariff,
        }
    }

    /// Validate a public issuance of `count` items.
    pub(crate) fn plan_public(&self, count: Count) -> Result<IssuePlan> {
        if count == 0 {
            return Err(TariffError::InvalidCount);
        }

        match self.public_issued.checked_add(count) {
            Some(next) if next <= self.public_cap => Ok(IssuePlan {
                pool: Pool::Public,
                count,
                base_value: self.public_issued,
                next_value: next,
            }),
            _ => Err(TariffError::CapacityExceeded {
                pool: Pool::Public,
                requested: count,
                remaining: self.public_remaining(),
            }),
        }
    }

    /// Validate a tariff issuance of `count` items against earned credits.
    pub(crate) fn plan_tariff(&self, count: Count) -> Result<IssuePlan> {
        let next = self.tariff.check_redeem(count)?;
        Ok(IssuePlan {
            pool: Pool::Tariff,
            count,
            base_value: self.tariff.credits_redeemed(),
            next_value: next,
        })
    }

    /// Apply a plan produced by this ledger. A plan whose base no longer
    /// matches the pool counter is rejected and nothing changes.
    pub(crate) fn commit(&mut self, plan: IssuePlan) -> Result<()> {
        let current = match plan.pool {
            Pool::Public => self.public_issued,
            Pool::Tariff => self.tariff.credits_redeemed(),
        };
        if current != plan.base_value {
            return Err(TariffError::StalePlan {
                pool: plan.pool,
                planned_from: plan.base_value,
                current,
            });
        }

        match plan.pool {
            Pool::Public => self.public_issued = plan.next_value,
            Pool::Tariff => self.tariff.commit_redeem(plan.base_value, plan.next_value)?,
        }
        debug!(
            target: "tariff",
            pool = %plan.pool,
            count = plan.count,
            total_issued = self.total_issued(),
            "issuance committed"
        );
        Ok(())
    }

    pub fn issue_public(&mut self, count: Count) -> Result<()> {
        let plan = self.plan_public(count)?;
        self.commit(plan)
    }

    pub fn issue_tariff(&mut self, count: Count) -> Result<()> {
        let plan = self.plan_tariff(count)?;
        self.commit(plan)
    }

    /// Refresh earned credits after the trade count moved.
    pub fn sync_credits(&mut self, trade_count: Count, rate: &RateCalculator) -> Count {
        self.tariff.sync(trade_count, rate)
    }

    pub fn public_cap(&self) -> Count {
        self.public_cap
    }

    pub fn public_issued(&self) -> Count {
        self.public_issued
    }

    pub fn public_remaining(&self) -> Count {
        self.public_cap.saturating_sub(self.public_issued)
    }

    pub fn tariff(&self) -> &TariffLedger {
        &self.tariff
    }

    /// `public_issued + credits_redeemed`. Each term is bounded by a `u64`
    /// cap, so the sum is widened rather than checked.
    pub fn total_issued(&self) -> u128 {
        self.public_issued as u128 + self.tariff.credits_redeemed() as u128
    }

    /// Re-check the supply invariants against the rate in force.
    pub fn audit(&self, trade_count: Count, rate: &RateCalculator) -> SupplyAudit {
        let mut issues = Vec::new();

        if self.public_issued > self.public_cap {
            issues.push(format!(
                "public issued {} exceeds cap {}",
                self.public_issued, self.public_cap
            ));
        }
        if self.tariff.credits_redeemed() > self.tariff.credits_earned() {
            issues.push(format!(
                "credits redeemed {} exceed credits earned {}",
                self.tariff.credits_redeemed(),
                self.tariff.credits_earned()
            ));
        }
        let expected = rate.credits_for(trade_count);
        if self.tariff.credits_earned() != expected {
            issues.push(format!(
                "credits earned {} differ from {} trades / {} = {}",
                self.tariff.credits_earned(),
                trade_count,
                rate.trades_per_credit(),
                expected
            ));
        }

        SupplyAudit {
            is_healthy: issues.is_empty(),
            issues,
            public_issued: self.public_issued,
            public_cap: self.public_cap,
            credits_earned: self.tariff.credits_earned(),
            credits_redeemed: self.tariff.credits_redeemed(),
            total_issued: self.total_issued(),
        }
    }
}

/// Result of a supply audit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyAudit {
    pub is_healthy: bool,
    pub issues: Vec<String>,
    pub public_issued: Count,
    pub public_cap: Count,
    pub credits_earned: Count,
    pub credits_redeemed: Count,
    pub total_issued: u128,
}
