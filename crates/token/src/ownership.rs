//! In-memory ownership ledger
//!
//! Tracks which account owns each item, per-item approvals and operator
//! approvals. Items are numbered sequentially from 0.

use crate::errors::OwnershipError;
use scalar_tariff::{Count, OwnershipLedger};
use scalar_types::{AccountId, TokenId};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

type Result<T> = std::result::Result<T, OwnershipError>;

#[derive(Debug, Clone, Default)]
pub struct InMemoryOwnershipLedger {
    owners: BTreeMap<TokenId, AccountId>,
    balances: HashMap<AccountId, u64>,
    token_approvals: HashMap<TokenId, AccountId>,
    /// (owner, operator) pairs
    operator_approvals: HashSet<(AccountId, AccountId)>,
    next_id: TokenId,
}

impl InMemoryOwnershipLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `count` items for `to`, all or nothing.
    pub fn mint(&mut self, to: &AccountId, count: Count) -> Result<Vec<TokenId>> {
        if to.is_zero() {
            return Err(OwnershipError::ZeroRecipient);
        }
        let end = self
            .next_id
            .checked_add(count)
            .ok_or(OwnershipError::IdsExhausted)?;

        let ids: Vec<TokenId> = (self.next_id..end).collect();
        for id in &ids {
            self.owners.insert(*id, *to);
        }
        *self.balances.entry(*to).or_insert(0) += count;
        self.next_id = end;

        debug!(target: "token", recipient = %to, first = ?ids.first(), count, "items created");
        Ok(ids)
    }

    pub fn owner_of(&self, token_id: TokenId) -> Result<AccountId> {
        self.owners
            .get(&token_id)
            .copied()
            .ok_or(OwnershipError::TokenNotFound { token_id })
    }

    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    pub fn total_minted(&self) -> u64 {
        self.next_id
    }

    /// Approve `spender` for a single item. Only the owner or one of the
    /// owner's operators may approve.
    pub fn approve(&mut self, caller: &AccountId, spender: &AccountId, token_id: TokenId) -> Result<()> {
        let owner = self.owner_of(token_id)?;
        if *spender == owner {
            return Err(OwnershipError::SelfApproval);
        }
        if *caller != owner && !self.is_approved_for_all(&owner, caller) {
            return Err(OwnershipError::NotAuthorized {
                caller: *caller,
                token_id,
            });
        }
        self.token_approvals.insert(token_id, *spender);
        Ok(())
    }

    pub fn get_approved(&self, token_id: TokenId) -> Result<Option<AccountId>> {
        self.owner_of(token_id)?;
        Ok(self.token_approvals.get(&token_id).copied())
    }

    pub fn set_approval_for_all(
        &mut self,
        owner: &AccountId,
        operator: &AccountId,
        approved: bool,
    ) -> Result<()> {
        if owner == operator {
            return Err(OwnershipError::SelfApproval);
        }
        if approved {
            self.operator_approvals.insert((*owner, *operator));
        } else {
            self.operator_approvals.remove(&(*owner, *operator));
        }
        Ok(())
    }

    pub fn is_approved_for_all(&self, owner: &AccountId, operator: &AccountId) -> bool {
        self.operator_approvals.contains(&(*owner, *operator))
    }

    /// Validate a transfer without applying it.
    pub fn check_transfer(
        &self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        token_id: TokenId,
    ) -> Result<()> {
        let owner = self.owner_of(token_id)?;
        if owner != *from {
            return Err(OwnershipError::NotOwner {
                token_id,
                from: *from,
            });
        }
        if to.is_zero() {
            return Err(OwnershipError::ZeroRecipient);
        }

        let authorized = *caller == owner
            || self.is_approved_for_all(&owner, caller)
            || self.token_approvals.get(&token_id) == Some(caller);
        if !authorized {
            return Err(OwnershipError::NotAuthorized {
                caller: *caller,
                token_id,
            });
        }
        Ok(())
    }

    /// Move one item, clearing its single-item approval.
    pub fn transfer(
        &mut self,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        token_id: TokenId,
    ) -> Result<()> {
        self.check_transfer(caller, from, to, token_id)?;

        self.token_approvals.remove(&token_id);
        self.owners.insert(token_id, *to);
        if let Some(balance) = self.balances.get_mut(from) {
            *balance -= 1;
        }
        *self.balances.entry(*to).or_insert(0) += 1;
        Ok(())
    }
}

impl OwnershipLedger for InMemoryOwnershipLedger {
    fn assign(&mut self, recipient: &AccountId, count: Count) -> anyhow::Result<Vec<TokenId>> {
        Ok(self.mint(recipient, count)?)
    }
}
