//! Error types for the token facade

use scalar_tariff::TariffError;
use scalar_treasury::TreasuryError;
use scalar_types::{AccountId, TokenId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OwnershipError {
    #[error("token {token_id} does not exist")]
    TokenNotFound { token_id: TokenId },

    #[error("{from} does not own token {token_id}")]
    NotOwner { token_id: TokenId, from: AccountId },

    #[error("{caller} is not authorized to move token {token_id}")]
    NotAuthorized { caller: AccountId, token_id: TokenId },

    #[error("cannot mint or transfer to the zero identity")]
    ZeroRecipient,

    #[error("approval to the current owner")]
    SelfApproval,

    #[error("token {token_id} appears more than once in the batch")]
    DuplicateToken { token_id: TokenId },

    #[error("token id space exhausted")]
    IdsExhausted,
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    Tariff(#[from] TariffError),

    #[error(transparent)]
    Treasury(#[from] TreasuryError),

    #[error(transparent)]
    Ownership(#[from] OwnershipError),
}

pub type Result<T> = std::result::Result<T, TokenError>;
