//! Immutable engine configuration

use crate::errors::{Result, TariffError};
use crate::types::Count;
use scalar_types::{AccountId, Wei, RATE_SCALE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default public mint price: 0.01 ETH.
pub const DEFAULT_UNIT_PRICE: Wei = 10_000_000_000_000_000;
/// Default tariff rate: one credit per 1000 trades.
pub const DEFAULT_TARIFF_RATE: u128 = 1_000_000_000_000_000;
/// Default public cap (tariff issuance is on top of this).
pub const DEFAULT_PUBLIC_CAP: Count = 1_000;

/// Marketplace transfer proxies recognized out of the box.
pub const DEFAULT_EXCHANGES: [&str; 3] = [
    // Seaport conduit
    "0x1E0049783F008A0085193E00003D00cd54003c71",
    // Rarible transfer proxy
    "0x4feE7B061C97C9c496b01DbcE9CDb10c02f0a0Be",
    // LooksRare ERC721 transfer manager
    "0xf42aa99F011A1fA7CDA90E5E98b277E306BcA83e",
];

/// Configuration tuple supplied once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TariffParams {
    /// Payment required per item in a public mint (wei)
    pub unit_price: Wei,
    /// Credits per trade, scaled by `RATE_SCALE`
    pub tariff_rate: u128,
    /// Maximum items issuable through the public pool
    pub public_cap: Count,
    /// Identities whose initiated transfers count as trades
    pub venues: BTreeSet<AccountId>,
    /// Identity allowed to redeem credits and withdraw funds
    pub owner: AccountId,
}

impl TariffParams {
    /// Deployment defaults for the given owner.
    pub fn with_owner(owner: AccountId) -> Self {
        Self {
            unit_price: DEFAULT_UNIT_PRICE,
            tariff_rate: DEFAULT_TARIFF_RATE,
            public_cap: DEFAULT_PUBLIC_CAP,
            venues: default_venues(),
            owner,
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.tariff_rate == 0 {
            return Err(TariffError::InvalidConfig("tariff rate must be positive"));
        }
        if self.tariff_rate > RATE_SCALE {
            return Err(TariffError::InvalidConfig(
                "tariff rate cannot exceed RATE_SCALE",
            ));
        }
        if self.public_cap == 0 {
            return Err(TariffError::InvalidConfig("public cap must be positive"));
        }
        if self.unit_price == 0 {
            return Err(TariffError::InvalidConfig("unit price must be positive"));
        }
        if self.owner.is_zero() {
            return Err(TariffError::InvalidConfig("owner cannot be the zero identity"));
        }
        Ok(())
    }
}

/// Parsed form of [`DEFAULT_EXCHANGES`].
pub fn default_venues() -> BTreeSet<AccountId> {
    DEFAULT_EXCHANGES
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> AccountId {
        AccountId::from_label("owner")
    }

    #[test]
    fn defaults_are_valid() {
        let params = TariffParams::with_owner(owner());
        params.validate().unwrap();
        assert_eq!(params.venues.len(), 3);
    }

    #[test]
    fn zero_rate_rejected() {
        let mut params = TariffParams::with_owner(owner());
        params.tariff_rate = 0;
        assert!(matches!(
            params.validate(),
            Err(TariffError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rate_above_scale_rejected() {
        let mut params = TariffParams::with_owner(owner());
        params.tariff_rate = RATE_SCALE + 1;
        assert!(params.validate().is_err());

        params.tariff_rate = RATE_SCALE;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn zero_cap_and_price_rejected() {
        let mut params = TariffParams::with_owner(owner());
        params.public_cap = 0;
        assert!(params.validate().is_err());

        let mut params = TariffParams::with_owner(owner());
        params.unit_price = 0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_owner_rejected() {
        let params = TariffParams::with_owner(AccountId::ZERO);
        assert!(params.validate().is_err());
    }
}
