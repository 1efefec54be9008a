//! Persisted engine record
//!
//! The logical state layout: every counter plus the configuration tuple.
//! Any encoding works; JSON helpers are provided for the operator tooling.

use crate::authorizer::TariffEngine;
use crate::errors::{Result, TariffError};
use crate::ledger::TariffLedger;
use crate::params::TariffParams;
use crate::rate::RateCalculator;
use crate::supply::SupplyLedger;
use crate::trades::TradeCounter;
use crate::types::Count;
use scalar_types::{AccountId, Wei};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub trade_count: Count,
    pub credits_earned: Count,
    pub credits_redeemed: Count,
    pub public_issued: Count,
    pub unit_price: Wei,
    pub tariff_rate: u128,
    pub public_cap: Count,
    pub recognized_venues: BTreeSet<AccountId>,
    pub owner: AccountId,
}

impl EngineSnapshot {
    pub fn params(&self) -> TariffParams {
        TariffParams {
            unit_price: self.unit_price,
            tariff_rate: self.tariff_rate,
            public_cap: self.public_cap,
            venues: self.recognized_venues.clone(),
            owner: self.owner,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TariffError::CorruptSnapshot(format!("encode: {e}")))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| TariffError::CorruptSnapshot(format!("decode: {e}")))
    }
}

impl TariffEngine {
    pub fn snapshot(&self) -> EngineSnapshot {
        let params = self.params();
        EngineSnapshot {
            trade_count: self.trade_count(),
            credits_earned: self.credits_earned(),
            credits_redeemed: self.credits_redeemed(),
            public_issued: self.public_issued(),
            unit_price: params.unit_price,
            tariff_rate: params.tariff_rate,
            public_cap: params.public_cap,
            recognized_venues: params.venues,
            owner: params.owner,
        }
    }

    /// Rebuild an engine from a persisted record.
    ///
    /// The configuration must pass construction checks and the counters must
    /// satisfy the supply invariants, including the exact credit formula.
    pub fn restore(snapshot: EngineSnapshot) -> Result<Self> {
        let params = snapshot.params();
        params
            .validate()
            .map_err(|e| TariffError::CorruptSnapshot(e.to_string()))?;
        let rate = RateCalculator::new(params.tariff_rate)?;

        if snapshot.public_issued > snapshot.public_cap {
            return Err(TariffError::CorruptSnapshot(format!(
                "public issued {} exceeds cap {}",
                snapshot.public_issued, snapshot.public_cap
            )));
        }
        let expected = rate.credits_for(snapshot.trade_count);
        if snapshot.credits_earned != expected {
            return Err(TariffError::CorruptSnapshot(format!(
                "credits earned {} but {} trades yield {}",
                snapshot.credits_earned, snapshot.trade_count, expected
            )));
        }
        if snapshot.credits_redeemed > snapshot.credits_earned {
            return Err(TariffError::CorruptSnapshot(format!(
                "credits redeemed {} exceed credits earned {}",
                snapshot.credits_redeemed, snapshot.credits_earned
            )));
        }

        debug!(
            target: "tariff",
            trade_count = snapshot.trade_count,
            public_issued = snapshot.public_issued,
            credits_redeemed = snapshot.credits_redeemed,
            "engine restored from snapshot"
        );

        let tariff = TariffLedger::from_parts(snapshot.credits_earned, snapshot.credits_redeemed);
        Ok(TariffEngine::from_parts(
            snapshot.unit_price,
            snapshot.owner,
            rate,
            TradeCounter::with_count(snapshot.recognized_venues, snapshot.trade_count),
            SupplyLedger::from_parts(snapshot.public_cap, snapshot.public_issued, tariff),
        ))
    }
}
