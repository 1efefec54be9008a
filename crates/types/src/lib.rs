//! Scalar core types
//!
//! Identities, token identifiers and payment amounts shared by the tariff
//! engine, the treasury vault and the token facade.

pub mod address;
pub mod currency;

pub use address::*;
pub use currency::*;

/// Sequential identifier of an issued item. The first item is `0`.
pub type TokenId = u64;
