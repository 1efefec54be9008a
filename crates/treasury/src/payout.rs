//! Payout sink for withdrawals
//!
//! The vault never moves funds itself; it hands the swept amount to a
//! `Payout` implementation supplied by the host.

use anyhow::Result;
use scalar_types::{AccountId, Wei};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Interface for delivering funds to an account.
pub trait Payout: Send + Sync {
    /// Deliver `amount` wei to `recipient`.
    fn pay(&mut self, recipient: &AccountId, amount: Wei) -> Result<()>;
}

// -----------------------------------------------------------------------------
// In-memory implementation (simulation and testing)
// -----------------------------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryPayout {
    balances: HashMap<AccountId, Wei>,
    payments: Vec<(AccountId, Wei)>,
}

impl InMemoryPayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance_of(&self, account: &AccountId) -> Wei {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn payments(&self) -> &[(AccountId, Wei)] {
        &self.payments
    }
}

impl Payout for InMemoryPayout {
    fn pay(&mut self, recipient: &AccountId, amount: Wei) -> Result<()> {
        let balance = self.balances.entry(*recipient).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| anyhow::anyhow!("recipient balance overflow"))?;
        self.payments.push((*recipient, amount));
        Ok(())
    }
}
