//! Retained mint payments
//!
//! Tracks the held balance plus lifetime received/withdrawn totals, and
//! sweeps the whole balance to the owner on withdrawal.

use crate::payout::Payout;
use scalar_types::{format_eth, AccountId, Wei};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum TreasuryError {
    #[error("caller {caller} is not the vault owner")]
    Unauthorized { caller: AccountId },

    #[error("vault balance overflow")]
    BalanceOverflow,

    #[error("payout failed: {0}")]
    Payout(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, TreasuryError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundsVault {
    owner: AccountId,
    balance: Wei,
    total_received: Wei,
    total_withdrawn: Wei,
}

impl FundsVault {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            balance: 0,
            total_received: 0,
            total_withdrawn: 0,
        }
    }

    /// Retain an accepted payment, overpayment included.
    pub fn deposit(&mut self, amount: Wei) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(TreasuryError::BalanceOverflow)?;
        self.total_received = self.total_received.saturating_add(amount);
        self.balance = balance;

        debug!(target: "treasury", amount = %amount, balance = %self.balance, "payment retained");
        Ok(())
    }

    /// Can `amount` be deposited without overflowing the balance?
    pub fn can_accept(&self, amount: Wei) -> bool {
        self.balance.checked_add(amount).is_some()
    }

    /// Sweep the whole balance to the owner. Returns the amount paid out.
    ///
    /// The balance is zeroed only after the payout succeeds.
    pub fn withdraw<P>(&mut self, caller: &AccountId, payout: &mut P) -> Result<Wei>
    where
        P: Payout + ?Sized,
    {
        if *caller != self.owner {
            warn!(target: "treasury", %caller, "withdrawal by non-owner rejected");
            return Err(TreasuryError::Unauthorized { caller: *caller });
        }

        let amount = self.balance;
        if amount == 0 {
            debug!(target: "treasury", "withdrawal of empty vault");
            return Ok(0);
        }

        payout.pay(&self.owner, amount)?;
        self.balance = 0;
        self.total_withdrawn = self.total_withdrawn.saturating_add(amount);

        info!(
            target: "treasury",
            owner = %self.owner,
            amount_eth = %format_eth(amount),
            "vault swept to owner"
        );
        Ok(amount)
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn balance(&self) -> Wei {
        self.balance
    }

    pub fn total_received(&self) -> Wei {
        self.total_received
    }

    pub fn total_withdrawn(&self) -> Wei {
        self.total_withdrawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payout::InMemoryPayout;

    struct FailingPayout;

    impl Payout for FailingPayout {
        fn pay(&mut self, _recipient: &AccountId, _amount: Wei) -> anyhow::Result<()> {
            anyhow::bail!("transfer reverted")
        }
    }

    fn owner() -> AccountId {
        AccountId::from_label("owner")
    }

    #[test]
    fn deposit_and_sweep() {
        let mut vault = FundsVault::new(owner());
        let mut payout = InMemoryPayout::new();

        vault.deposit(10_000).unwrap();
        vault.deposit(2_500).unwrap();
        assert_eq!(vault.balance(), 12_500);

        let swept = vault.withdraw(&owner(), &mut payout).unwrap();
        assert_eq!(swept, 12_500);
        assert_eq!(vault.balance(), 0);
        assert_eq!(vault.total_received(), 12_500);
        assert_eq!(vault.total_withdrawn(), 12_500);
        assert_eq!(payout.balance_of(&owner()), 12_500);
    }

    #[test]
    fn non_owner_cannot_withdraw() {
        let mut vault = FundsVault::new(owner());
        let mut payout = InMemoryPayout::new();
        vault.deposit(1_000).unwrap();

        let mallory = AccountId::from_label("mallory");
        let err = vault.withdraw(&mallory, &mut payout).unwrap_err();
        assert!(matches!(err, TreasuryError::Unauthorized { caller } if caller == mallory));
        assert_eq!(vault.balance(), 1_000);
        assert!(payout.payments().is_empty());
    }

    #[test]
    fn empty_vault_withdraws_nothing() {
        let mut vault = FundsVault::new(owner());
        let mut payout = InMemoryPayout::new();
        assert_eq!(vault.withdraw(&owner(), &mut payout).unwrap(), 0);
        assert!(payout.payments().is_empty());
    }

    #[test]
    fn failed_payout_keeps_balance() {
        let mut vault = FundsVault::new(owner());
        vault.deposit(1_000).unwrap();

        let err = vault.withdraw(&owner(), &mut FailingPayout).unwrap_err();
        assert!(matches!(err, TreasuryError::Payout(_)));
        assert_eq!(vault.balance(), 1_000);
        assert_eq!(vault.total_withdrawn(), 0);
    }

    #[test]
    fn overflowing_deposit_rejected() {
        let mut vault = FundsVault::new(owner());
        vault.deposit(Wei::MAX).unwrap();
        assert!(!vault.can_accept(1));
        assert!(matches!(vault.deposit(1), Err(TreasuryError::BalanceOverflow)));
        assert_eq!(vault.balance(), Wei::MAX);
    }
}
