//! Engine-level value types

use scalar_types::{AccountId, TokenId, Wei};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Item count. Always a positive integer when supplied to a mint.
pub type Count = u64;

/// Issuance pool an item was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pool {
    /// Paid issuance bounded by the public cap
    Public,
    /// Owner redemption bounded by earned credits
    Tariff,
}

impl Pool {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pool::Public => "public",
            Pool::Tariff => "tariff",
        }
    }
}

impl fmt::Display for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a successful mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub pool: Pool,
    pub recipient: AccountId,
    pub token_ids: Vec<TokenId>,
    /// Payment the caller may retain. Zero for tariff redemptions.
    pub payment_retained: Wei,
}

impl MintReceipt {
    pub fn count(&self) -> Count {
        self.token_ids.len() as Count
    }
}
