//! Property tests for the tariff engine invariants
//!
//! Random call sequences must keep every counter monotone, keep the credit
//! cache equal to the closed-form formula, and leave failed calls without
//! any effect.

use proptest::prelude::*;
use scalar_tariff::{Count, OwnershipLedger, Pool, TariffEngine, TariffError, TariffParams};
use scalar_types::{AccountId, TokenId, RATE_SCALE};

#[derive(Default)]
struct SeqLedger {
    next_id: TokenId,
}

impl OwnershipLedger for SeqLedger {
    fn assign(&mut self, _recipient: &AccountId, count: Count) -> anyhow::Result<Vec<TokenId>> {
        let ids = (self.next_id..self.next_id + count).collect();
        self.next_id += count;
        Ok(ids)
    }
}

#[derive(Debug, Clone)]
enum Call {
    Trade { venue: bool, items: u64 },
    Public { count: u64, pay_units: u64, extra: u128 },
    Tariff { as_owner: bool, count: u64 },
}

fn call_strategy() -> impl Strategy<Value = Call> {
    prop_oneof![
        (any::<bool>(), 1u64..40).prop_map(|(venue, items)| Call::Trade { venue, items }),
        (0u64..30, 0u64..30, 0u128..1_000)
            .prop_map(|(count, pay_units, extra)| Call::Public { count, pay_units, extra }),
        (any::<bool>(), 0u64..6).prop_map(|(as_owner, count)| Call::Tariff { as_owner, count }),
    ]
}

fn counters(engine: &TariffEngine) -> (Count, Count, Count, Count) {
    (
        engine.trade_count(),
        engine.credits_earned(),
        engine.credits_redeemed(),
        engine.public_issued(),
    )
}

fn build(tariff_rate: u128, public_cap: Count) -> TariffEngine {
    TariffEngine::new(TariffParams {
        unit_price: 1_000,
        tariff_rate,
        public_cap,
        venues: [AccountId::from_label("venue")].into_iter().collect(),
        owner: AccountId::from_label("owner"),
    })
    .unwrap()
}

proptest! {
    #[test]
    fn counters_never_decrease_and_invariants_hold(
        tariff_rate in 1u128..=RATE_SCALE / 2,
        public_cap in 1u64..120,
        calls in proptest::collection::vec(call_strategy(), 1..80),
    ) {
        let venue = AccountId::from_label("venue");
        let owner = AccountId::from_label("owner");
        let buyer = AccountId::from_label("buyer");
        let mut engine = build(tariff_rate, public_cap);
        let mut ledger = SeqLedger::default();

        for call in calls {
            let before = counters(&engine);
            let outcome = match call {
                Call::Trade { venue: true, items } => engine.record_trades(&venue, items).map(|_| ()),
                Call::Trade { venue: false, items } => engine.record_trades(&buyer, items).map(|_| ()),
                Call::Public { count, pay_units, extra } => {
                    let payment = 1_000u128 * pay_units as u128 + extra;
                    engine.mint_public(&mut ledger, &buyer, &buyer, count, payment).map(|_| ())
                }
                Call::Tariff { as_owner, count } => {
                    let caller = if as_owner { owner } else { buyer };
                    engine.mint_tariff(&mut ledger, &caller, &owner, count).map(|_| ())
                }
            };
            let after = counters(&engine);

            prop_assert!(after.0 >= before.0);
            prop_assert!(after.1 >= before.1);
            prop_assert!(after.2 >= before.2);
            prop_assert!(after.3 >= before.3);
            if outcome.is_err() {
                prop_assert_eq!(before, after);
            }

            prop_assert!(engine.public_issued() <= engine.public_cap());
            prop_assert!(engine.credits_redeemed() <= engine.credits_earned());
            prop_assert_eq!(
                engine.credits_earned(),
                engine.trade_count() / engine.rate().trades_per_credit()
            );
            prop_assert_eq!(
                engine.total_issued(),
                engine.public_issued() as u128 + engine.credits_redeemed() as u128
            );
            prop_assert!(engine.audit().is_healthy);
        }
    }

    #[test]
    fn credits_match_closed_form_for_any_trade_count(
        tariff_rate in 1u128..=RATE_SCALE,
        trades in 0u64..5_000,
    ) {
        let venue = AccountId::from_label("venue");
        let mut engine = build(tariff_rate, 10);
        engine.record_trades(&venue, trades).unwrap();

        let trades_per_credit = (RATE_SCALE / tariff_rate) as u64;
        prop_assert_eq!(engine.trade_count(), trades);
        prop_assert_eq!(engine.credits_earned(), trades / trades_per_credit);
    }

    #[test]
    fn batch_and_unit_trades_agree(
        tariff_rate in 1u128..=RATE_SCALE,
        batches in proptest::collection::vec(1u64..25, 1..20),
    ) {
        let venue = AccountId::from_label("venue");
        let mut batched = build(tariff_rate, 10);
        let mut unit = build(tariff_rate, 10);

        for items in batches {
            batched.record_trades(&venue, items).unwrap();
            for _ in 0..items {
                unit.record_trade(&venue).unwrap();
            }
        }

        prop_assert_eq!(batched.snapshot(), unit.snapshot());
    }
}

#[test]
fn pools_are_independent() {
    let venue = AccountId::from_label("venue");
    let owner = AccountId::from_label("owner");
    let buyer = AccountId::from_label("buyer");
    let mut ledger = SeqLedger::default();
    let mut engine = build(RATE_SCALE / 10, 5);

    // Exhausted public pool does not block tariff redemption.
    engine.mint_public(&mut ledger, &buyer, &buyer, 5, 5_000).unwrap();
    engine.record_trades(&venue, 20).unwrap();
    engine.mint_tariff(&mut ledger, &owner, &owner, 2).unwrap();

    // Exhausted tariff pool does not block public issuance.
    let mut engine = build(RATE_SCALE / 10, 5);
    engine.record_trades(&venue, 10).unwrap();
    engine.mint_tariff(&mut ledger, &owner, &owner, 1).unwrap();
    assert!(matches!(
        engine.mint_tariff(&mut ledger, &owner, &owner, 1),
        Err(TariffError::CapacityExceeded { pool: Pool::Tariff, .. })
    ));
    engine.mint_public(&mut ledger, &buyer, &buyer, 5, 5_000).unwrap();
    assert_eq!(engine.total_issued(), 6);
}
