//! Scalar Treasury Module
//!
//! Holds payments accepted by public mints until the owner sweeps them out.

pub mod payout;
pub mod vault;

pub use payout::{InMemoryPayout, Payout};
pub use vault::{FundsVault, TreasuryError};
