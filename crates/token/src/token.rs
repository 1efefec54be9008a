//! Scalar token facade
//!
//! Every public method takes the state lock exactly once, so each call is a
//! single critical section: it either commits entirely or changes nothing.

use crate::errors::{OwnershipError, Result};
use crate::ownership::InMemoryOwnershipLedger;
use parking_lot::RwLock;
use scalar_tariff::{Count, EngineSnapshot, MintReceipt, SupplyAudit, TariffEngine, TariffParams};
use scalar_treasury::{FundsVault, Payout, TreasuryError};
use scalar_types::{AccountId, TokenId, Wei};
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug)]
struct TokenState {
    engine: TariffEngine,
    ledger: InMemoryOwnershipLedger,
    vault: FundsVault,
}

/// A tariff-accruing item collection.
#[derive(Debug)]
pub struct ScalarToken {
    name: String,
    symbol: String,
    state: RwLock<TokenState>,
}

impl ScalarToken {
    /// Deploy a new collection with zeroed counters.
    pub fn new(name: impl Into<String>, symbol: impl Into<String>, params: TariffParams) -> Result<Self> {
        let vault = FundsVault::new(params.owner);
        let engine = TariffEngine::new(params)?;
        let token = Self {
            name: name.into(),
            symbol: symbol.into(),
            state: RwLock::new(TokenState {
                engine,
                ledger: InMemoryOwnershipLedger::new(),
                vault,
            }),
        };

        info!(target: "token", name = %token.name, symbol = %token.symbol, "collection deployed");
        Ok(token)
    }

    // ---------------------------------------------------------------------
    // Minting
    // ---------------------------------------------------------------------

    /// Paid public mint. The whole payment is retained by the vault.
    pub fn mint(
        &self,
        requester: &AccountId,
        recipient: &AccountId,
        count: Count,
        payment: Wei,
    ) -> Result<MintReceipt> {
        let mut state = self.state.write();
        let TokenState {
            engine,
            ledger,
            vault,
        } = &mut *state;

        // Checked up front so the deposit below cannot fail after issuance.
        if !vault.can_accept(payment) {
            return Err(TreasuryError::BalanceOverflow.into());
        }

        let receipt = engine.mint_public(ledger, requester, recipient, count, payment)?;
        vault.deposit(receipt.payment_retained)?;
        Ok(receipt)
    }

    /// Owner redemption of earned tariff credits.
    pub fn mint_tariff(
        &self,
        requester: &AccountId,
        recipient: &AccountId,
        count: Count,
    ) -> Result<MintReceipt> {
        let mut state = self.state.write();
        let TokenState { engine, ledger, .. } = &mut *state;
        Ok(engine.mint_tariff(ledger, requester, recipient, count)?)
    }

    // ---------------------------------------------------------------------
    // Transfers
    // ---------------------------------------------------------------------

    /// Move one item. `initiator` is the account executing the transfer (the
    /// owner, an approved account, or an operator such as a marketplace).
    pub fn transfer_from(
        &self,
        initiator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        token_id: TokenId,
    ) -> Result<()> {
        let mut state = self.state.write();
        let TokenState { engine, ledger, .. } = &mut *state;

        ledger.check_transfer(initiator, from, to, token_id)?;
        // Trade is recorded before the transfer is final.
        engine.record_trade(initiator)?;
        ledger.transfer(initiator, from, to, token_id)?;

        debug!(target: "token", %initiator, %from, %to, token_id, "item transferred");
        Ok(())
    }

    /// Same as [`ScalarToken::transfer_from`]; recipients need no acceptance
    /// hook in this ledger.
    pub fn safe_transfer_from(
        &self,
        initiator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        token_id: TokenId,
    ) -> Result<()> {
        self.transfer_from(initiator, from, to, token_id)
    }

    /// Move several items in one call. Every item counts as one trade; if any
    /// item fails validation nothing moves.
    pub fn batch_transfer_from(
        &self,
        initiator: &AccountId,
        from: &AccountId,
        to: &AccountId,
        token_ids: &[TokenId],
    ) -> Result<()> {
        let mut state = self.state.write();
        let TokenState { engine, ledger, .. } = &mut *state;

        let mut seen = HashSet::with_capacity(token_ids.len());
        for &token_id in token_ids {
            if !seen.insert(token_id) {
                return Err(OwnershipError::DuplicateToken { token_id }.into());
            }
            ledger.check_transfer(initiator, from, to, token_id)?;
        }

        engine.record_trades(initiator, token_ids.len() as Count)?;
        for &token_id in token_ids {
            ledger.transfer(initiator, from, to, token_id)?;
        }

        debug!(target: "token", %initiator, %from, %to, items = token_ids.len(), "batch transferred");
        Ok(())
    }

    pub fn approve(&self, caller: &AccountId, spender: &AccountId, token_id: TokenId) -> Result<()> {
        Ok(self.state.write().ledger.approve(caller, spender, token_id)?)
    }

    pub fn set_approval_for_all(
        &self,
        owner: &AccountId,
        operator: &AccountId,
        approved: bool,
    ) -> Result<()> {
        Ok(self
            .state
            .write()
            .ledger
            .set_approval_for_all(owner, operator, approved)?)
    }

    // ---------------------------------------------------------------------
    // Funds
    // ---------------------------------------------------------------------

    /// Sweep retained payments to the owner.
    pub fn withdraw<P>(&self, caller: &AccountId, payout: &mut P) -> Result<Wei>
    where
        P: Payout + ?Sized,
    {
        Ok(self.state.write().vault.withdraw(caller, payout)?)
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn owner(&self) -> AccountId {
        *self.state.read().engine.owner()
    }

    pub fn price(&self) -> Wei {
        self.state.read().engine.unit_price()
    }

    pub fn max_supply(&self) -> Count {
        self.state.read().engine.public_cap()
    }

    pub fn tariff_rate(&self) -> u128 {
        self.state.read().engine.rate().tariff_rate()
    }

    /// Credits earned so far (cumulative, including redeemed ones).
    pub fn tariff_earned(&self) -> Count {
        self.state.read().engine.credits_earned()
    }

    pub fn tariff_redeemed(&self) -> Count {
        self.state.read().engine.credits_redeemed()
    }

    pub fn tariff_remaining(&self) -> Count {
        self.state.read().engine.remaining_credits()
    }

    pub fn trade_count(&self) -> Count {
        self.state.read().engine.trade_count()
    }

    pub fn public_issued(&self) -> Count {
        self.state.read().engine.public_issued()
    }

    /// Items issued through both pools.
    pub fn total_supply(&self) -> u128 {
        self.state.read().engine.total_issued()
    }

    /// Is `venue` a recognized exchange?
    pub fn exchanges(&self, venue: &AccountId) -> bool {
        self.state.read().engine.is_venue(venue)
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.state.read().ledger.balance_of(account)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<AccountId> {
        Ok(self.state.read().ledger.owner_of(token_id)?)
    }

    pub fn get_approved(&self, token_id: TokenId) -> Result<Option<AccountId>> {
        Ok(self.state.read().ledger.get_approved(token_id)?)
    }

    pub fn is_approved_for_all(&self, owner: &AccountId, operator: &AccountId) -> bool {
        self.state.read().ledger.is_approved_for_all(owner, operator)
    }

    /// Retained, not yet withdrawn, payments.
    pub fn vault_balance(&self) -> Wei {
        self.state.read().vault.balance()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        self.state.read().engine.snapshot()
    }

    pub fn audit(&self) -> SupplyAudit {
        self.state.read().engine.audit()
    }
}
