//! Recognized-venue trade counting

use crate::errors::{Result, TariffError};
use crate::types::Count;
use scalar_types::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::trace;

/// Counts unit transfers initiated by recognized venues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCounter {
    venues: BTreeSet<AccountId>,
    trade_count: Count,
}

impl TradeCounter {
    pub fn new(venues: BTreeSet<AccountId>) -> Self {
        Self {
            venues,
            trade_count: 0,
        }
    }

    pub(crate) fn with_count(venues: BTreeSet<AccountId>, trade_count: Count) -> Self {
        Self {
            venues,
            trade_count,
        }
    }

    /// Record one unit transfer. Returns `true` when the initiator is a
    /// recognized venue and the count moved.
    pub fn record(&mut self, initiator: &AccountId) -> Result<bool> {
        Ok(self.record_many(initiator, 1)? > 0)
    }

    /// Record `transfers` unit transfers from the same initiator, as a batch
    /// transfer does. Either all of them count or none do.
    pub fn record_many(&mut self, initiator: &AccountId, transfers: Count) -> Result<Count> {
        if !self.venues.contains(initiator) {
            trace!(target: "tariff", %initiator, "transfer from unrecognized initiator ignored");
            return Ok(0);
        }

        self.trade_count = self
            .trade_count
            .checked_add(transfers)
            .ok_or(TariffError::ArithmeticOverflow("trade count"))?;
        Ok(transfers)
    }

    pub fn is_venue(&self, id: &AccountId) -> bool {
        self.venues.contains(id)
    }

    pub fn venues(&self) -> &BTreeSet<AccountId> {
        &self.venues
    }

    pub fn trade_count(&self) -> Count {
        self.trade_count
    }
}
