//! Issuance authorization
//!
//! Entry point for both mint paths. Each call validates everything first,
//! asks the ownership ledger to create the items, and only then commits the
//! pool counter. A refused assignment leaves every counter untouched.

use crate::errors::{Result, TariffError};
use crate::params::TariffParams;
use crate::rate::RateCalculator;
use crate::supply::{SupplyAudit, SupplyLedger};
use crate::trades::TradeCounter;
use crate::types::{Count, MintReceipt, Pool};
use metrics::{counter, gauge};
use scalar_types::{AccountId, TokenId, Wei};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Item ownership collaborator.
///
/// The engine calls `assign` once per successful mint. Implementations must
/// either create exactly `count` items or fail without creating any.
pub trait OwnershipLedger {
    /// Create `count` new items owned by `recipient` and return their ids.
    fn assign(&mut self, recipient: &AccountId, count: Count) -> anyhow::Result<Vec<TokenId>>;
}

/// The accrual-and-authorization engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TariffEngine {
    unit_price: Wei,
    owner: AccountId,
    rate: RateCalculator,
    trades: TradeCounter,
    supply: SupplyLedger,
}

impl TariffEngine {
    /// Build an engine with all counters at zero.
    pub fn new(params: TariffParams) -> Result<Self> {
        params.validate()?;
        let rate = RateCalculator::new(params.tariff_rate)?;

        info!(
            target: "tariff",
            unit_price = %params.unit_price,
            trades_per_credit = rate.trades_per_credit(),
            public_cap = params.public_cap,
            venues = params.venues.len(),
            "tariff engine initialized"
        );

        Ok(Self {
            unit_price: params.unit_price,
            owner: params.owner,
            rate,
            trades: TradeCounter::new(params.venues),
            supply: SupplyLedger::new(params.public_cap),
        })
    }

    pub(crate) fn from_parts(
        unit_price: Wei,
        owner: AccountId,
        rate: RateCalculator,
        trades: TradeCounter,
        supply: SupplyLedger,
    ) -> Self {
        Self {
            unit_price,
            owner,
            rate,
            trades,
            supply,
        }
    }

    // ---------------------------------------------------------------------
    // Trade accrual
    // ---------------------------------------------------------------------

    /// Observe one unit transfer initiated by `initiator`.
    ///
    /// Recognized venues move the trade count by one and refresh the earned
    /// credits; anyone else is ignored.
    pub fn record_trade(&mut self, initiator: &AccountId) -> Result<bool> {
        Ok(self.record_trades(initiator, 1)? > 0)
    }

    /// Observe `transfers` unit transfers by the same initiator, one per item
    /// of a batch transfer. Returns how many counted.
    pub fn record_trades(&mut self, initiator: &AccountId, transfers: Count) -> Result<Count> {
        let recorded = self.trades.record_many(initiator, transfers)?;
        if recorded == 0 {
            return Ok(0);
        }

        let trade_count = self.trades.trade_count();
        let gained = self.supply.sync_credits(trade_count, &self.rate);
        counter!("scalar_trades_recorded_total").increment(recorded);

        if gained > 0 {
            let earned = self.supply.tariff().credits_earned();
            gauge!("scalar_credits_earned").set(earned as f64);
            info!(
                target: "tariff",
                %initiator,
                trade_count,
                credits_earned = earned,
                gained,
                "tariff credit earned"
            );
        } else {
            debug!(target: "tariff", %initiator, trade_count, "trade recorded");
        }

        Ok(recorded)
    }

    // ---------------------------------------------------------------------
    // Issuance
    // ---------------------------------------------------------------------

    /// Paid public mint of `count` items to `recipient`.
    ///
    /// Checks run in order: count, payment, public capacity. Overpayment is
    /// accepted and reported in the receipt as retained.
    pub fn mint_public<L>(
        &mut self,
        ledger: &mut L,
        requester: &AccountId,
        recipient: &AccountId,
        count: Count,
        payment: Wei,
    ) -> Result<MintReceipt>
    where
        L: OwnershipLedger + ?Sized,
    {
        let result = self.try_mint_public(ledger, recipient, count, payment);
        self.observe(Pool::Public, requester, count, &result);
        result
    }

    fn try_mint_public<L>(
        &mut self,
        ledger: &mut L,
        recipient: &AccountId,
        count: Count,
        payment: Wei,
    ) -> Result<MintReceipt>
    where
        L: OwnershipLedger + ?Sized,
    {
        if count == 0 {
            return Err(TariffError::InvalidCount);
        }

        let required = match self.required_payment(count) {
            Ok(required) => required,
            // An unrepresentable price can never be covered by a `Wei` payment.
            Err(_) => {
                return Err(TariffError::InsufficientPayment {
                    required: Wei::MAX,
                    supplied: payment,
                })
            }
        };
        if payment < required {
            return Err(TariffError::InsufficientPayment {
                required,
                supplied: payment,
            });
        }

        let plan = self.supply.plan_public(count)?;
        let token_ids = ledger.assign(recipient, count)?;
        self.supply.commit(plan)?;

        Ok(MintReceipt {
            pool: Pool::Public,
            recipient: *recipient,
            token_ids,
            payment_retained: payment,
        })
    }

    /// Owner redemption of `count` earned credits as new items for
    /// `recipient`.
    ///
    /// Checks run in order: owner identity, count, remaining credits. The
    /// public cap is not consulted.
    pub fn mint_tariff<L>(
        &mut self,
        ledger: &mut L,
        requester: &AccountId,
        recipient: &AccountId,
        count: Count,
    ) -> Result<MintReceipt>
    where
        L: OwnershipLedger + ?Sized,
    {
        let result = self.try_mint_tariff(ledger, requester, recipient, count);
        self.observe(Pool::Tariff, requester, count, &result);
        result
    }

    fn try_mint_tariff<L>(
        &mut self,
        ledger: &mut L,
        requester: &AccountId,
        recipient: &AccountId,
        count: Count,
    ) -> Result<MintReceipt>
    where
        L: OwnershipLedger + ?Sized,
    {
        self.ensure_owner(requester)?;

        let plan = self.supply.plan_tariff(count)?;
        let token_ids = ledger.assign(recipient, count)?;
        self.supply.commit(plan)?;

        Ok(MintReceipt {
            pool: Pool::Tariff,
            recipient: *recipient,
            token_ids,
            payment_retained: 0,
        })
    }

    fn observe(
        &self,
        pool: Pool,
        requester: &AccountId,
        count: Count,
        result: &Result<MintReceipt>,
    ) {
        match result {
            Ok(receipt) => {
                let name = match pool {
                    Pool::Public => "scalar_public_minted_total",
                    Pool::Tariff => "scalar_tariff_minted_total",
                };
                counter!(name).increment(receipt.count());
                info!(
                    target: "tariff",
                    %pool,
                    %requester,
                    recipient = %receipt.recipient,
                    count,
                    total_issued = self.total_issued(),
                    "mint committed"
                );
            }
            Err(err) => {
                counter!(
                    "scalar_mint_rejected_total",
                    "pool" => pool.as_str(),
                    "reason" => err.kind()
                )
                .increment(1);
                warn!(target: "tariff", %pool, %requester, count, error = %err, "mint rejected");
            }
        }
    }

    /// Fail with `Unauthorized` unless `caller` is the configured owner.
    pub fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.owner {
            return Err(TariffError::Unauthorized { caller: *caller });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// `unit_price × count`, checked.
    pub fn required_payment(&self, count: Count) -> Result<Wei> {
        self.unit_price
            .checked_mul(count as Wei)
            .ok_or(TariffError::ArithmeticOverflow("unit price × count"))
    }

    pub fn params(&self) -> TariffParams {
        TariffParams {
            unit_price: self.unit_price,
            tariff_rate: self.rate.tariff_rate(),
            public_cap: self.supply.public_cap(),
            venues: self.trades.venues().clone(),
            owner: self.owner,
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn unit_price(&self) -> Wei {
        self.unit_price
    }

    pub fn rate(&self) -> &RateCalculator {
        &self.rate
    }

    pub fn venues(&self) -> &BTreeSet<AccountId> {
        self.trades.venues()
    }

    pub fn is_venue(&self, id: &AccountId) -> bool {
        self.trades.is_venue(id)
    }

    pub fn trade_count(&self) -> Count {
        self.trades.trade_count()
    }

    pub fn credits_earned(&self) -> Count {
        self.supply.tariff().credits_earned()
    }

    pub fn credits_redeemed(&self) -> Count {
        self.supply.tariff().credits_redeemed()
    }

    pub fn remaining_credits(&self) -> Count {
        self.supply.tariff().remaining_credits()
    }

    pub fn public_cap(&self) -> Count {
        self.supply.public_cap()
    }

    pub fn public_issued(&self) -> Count {
        self.supply.public_issued()
    }

    pub fn public_remaining(&self) -> Count {
        self.supply.public_remaining()
    }

    pub fn total_issued(&self) -> u128 {
        self.supply.total_issued()
    }

    pub fn supply(&self) -> &SupplyLedger {
        &self.supply
    }

    pub fn audit(&self) -> SupplyAudit {
        self.supply.audit(self.trades.trade_count(), &self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::EngineSnapshot;
    use anyhow::bail;

    /// Sequential ids, optionally refusing every assignment.
    #[derive(Default)]
    struct CountingLedger {
        next_id: TokenId,
        refuse: bool,
        assignments: Vec<(AccountId, Count)>,
    }

    impl OwnershipLedger for CountingLedger {
        fn assign(&mut self, recipient: &AccountId, count: Count) -> anyhow::Result<Vec<TokenId>> {
            if self.refuse {
                bail!("assignment refused");
            }
            let ids = (self.next_id..self.next_id + count).collect();
            self.next_id += count;
            self.assignments.push((*recipient, count));
            Ok(ids)
        }
    }

    fn owner() -> AccountId {
        AccountId::from_label("owner")
    }

    fn seaport() -> AccountId {
        AccountId::from_label("seaport")
    }

    fn engine() -> TariffEngine {
        TariffEngine::new(TariffParams {
            unit_price: 10_000_000_000_000_000,
            tariff_rate: 100_000_000_000_000_000,
            public_cap: 100,
            venues: [seaport()].into_iter().collect(),
            owner: owner(),
        })
        .unwrap()
    }

    #[test]
    fn public_mint_assigns_sequential_ids() {
        let mut engine = engine();
        let mut ledger = CountingLedger::default();
        let alice = AccountId::from_label("alice");

        let receipt = engine
            .mint_public(&mut ledger, &alice, &alice, 3, 30_000_000_000_000_000)
            .unwrap();
        assert_eq!(receipt.token_ids, vec![0, 1, 2]);
        assert_eq!(receipt.pool, Pool::Public);
        assert_eq!(engine.public_issued(), 3);
        assert_eq!(ledger.assignments, vec![(alice, 3)]);
    }

    #[test]
    fn total_issued_past_u64_range() {
        let mut engine = TariffEngine::restore(EngineSnapshot {
            trade_count: Count::MAX,
            credits_earned: Count::MAX,
            credits_redeemed: 0,
            public_issued: Count::MAX - 1,
            unit_price: 1,
            tariff_rate: 1_000_000_000_000_000_000,
            public_cap: Count::MAX,
            recognized_venues: [seaport()].into_iter().collect(),
            owner: owner(),
        })
        .unwrap();
        let mut ledger = CountingLedger::default();
        let alice = AccountId::from_label("alice");

        engine.mint_public(&mut ledger, &alice, &alice, 1, 1).unwrap();
        engine.mint_tariff(&mut ledger, &owner(), &alice, 2).unwrap();
        assert_eq!(engine.total_issued(), Count::MAX as u128 + 2);
    }

    #[test]
    fn overpayment_is_retained() {
        let mut engine = engine();
        let mut ledger = CountingLedger::default();
        let alice = AccountId::from_label("alice");

        let receipt = engine
            .mint_public(&mut ledger, &alice, &alice, 1, 50_000_000_000_000_000)
            .unwrap();
        assert_eq!(receipt.payment_retained, 50_000_000_000_000_000);
    }

    #[test]
    fn zero_count_checked_before_payment() {
        let mut engine = engine();
        let mut ledger = CountingLedger::default();
        let alice = AccountId::from_label("alice");

        let err = engine.mint_public(&mut ledger, &alice, &alice, 0, 0).unwrap_err();
        assert!(matches!(err, TariffError::InvalidCount));
    }

    #[test]
    fn payment_checked_before_capacity() {
        let mut engine = engine();
        let mut ledger = CountingLedger::default();
        let alice = AccountId::from_label("alice");

        let err = engine.mint_public(&mut ledger, &alice, &alice, 101, 0).unwrap_err();
        assert!(matches!(err, TariffError::InsufficientPayment { .. }));
    }

    #[test]
    fn overflowing_price_is_insufficient_payment() {
        let mut engine = engine();
        let mut ledger = CountingLedger::default();
        let alice = AccountId::from_label("alice");

        let err = engine
            .mint_public(&mut ledger, &alice, &alice, Count::MAX, Wei::MAX)
            .unwrap_err();
        match err {
            TariffError::InsufficientPayment { required, supplied } => {
                assert_eq!(required, Wei::MAX);
                assert_eq!(supplied, Wei::MAX);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(engine.public_issued(), 0);
    }

    #[test]
    fn refused_assignment_rolls_back() {
        let mut engine = engine();
        let mut ledger = CountingLedger {
            refuse: true,
            ..Default::default()
        };
        let alice = AccountId::from_label("alice");

        let err = engine
            .mint_public(&mut ledger, &alice, &alice, 1, 10_000_000_000_000_000)
            .unwrap_err();
        assert!(matches!(err, TariffError::Ledger(_)));
        assert_eq!(engine.public_issued(), 0);

        engine.record_trades(&seaport(), 10).unwrap();
        let err = engine.mint_tariff(&mut ledger, &owner(), &owner(), 1).unwrap_err();
        assert!(matches!(err, TariffError::Ledger(_)));
        assert_eq!(engine.credits_redeemed(), 0);
    }

    #[test]
    fn tariff_mint_requires_owner_first() {
        let mut engine = engine();
        let mut ledger = CountingLedger::default();
        let mallory = AccountId::from_label("mallory");

        // Unauthorized wins over the invalid count.
        let err = engine.mint_tariff(&mut ledger, &mallory, &mallory, 0).unwrap_err();
        assert!(matches!(err, TariffError::Unauthorized { caller } if caller == mallory));

        let err = engine.mint_tariff(&mut ledger, &owner(), &owner(), 0).unwrap_err();
        assert!(matches!(err, TariffError::InvalidCount));
    }

    #[test]
    fn trades_feed_credits() {
        let mut engine = engine();
        assert!(engine.record_trade(&seaport()).unwrap());
        assert!(!engine.record_trade(&AccountId::from_label("alice")).unwrap());
        engine.record_trades(&seaport(), 11).unwrap();

        assert_eq!(engine.trade_count(), 12);
        assert_eq!(engine.credits_earned(), 1);
        assert!(engine.audit().is_healthy);
    }

    #[test]
    fn params_round_trip_through_engine() {
        let engine = engine();
        let params = engine.params();
        assert_eq!(params.public_cap, 100);
        assert_eq!(params.owner, owner());
        assert_eq!(TariffEngine::new(params).unwrap(), engine);
    }
}
