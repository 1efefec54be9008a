//! Scalar Token
//!
//! Wires the ownership ledger, the tariff engine and the funds vault into a
//! single token. Every transfer initiated by a recognized venue accrues
//! tariff credits; the owner redeems them as extra items beyond the public
//! cap.

pub mod errors;
pub mod ownership;
pub mod token;

pub use errors::*;
pub use ownership::*;
pub use token::*;
