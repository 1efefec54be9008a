//! Scalar Tariff Engine
//!
//! Accrual-and-authorization core of the Scalar token:
//! - Converts recognized-venue transfers into tariff credits with integer rate math
//! - Keeps two independently capped issuance pools (public sale and tariff)
//! - Gates every mint behind count, payment, capacity and owner checks
//!
//! The engine is a synchronous state machine. Hosts that run calls
//! concurrently must hold one critical section per call.

pub mod authorizer;
pub mod errors;
pub mod ledger;
pub mod params;
pub mod rate;
pub mod snapshot;
pub mod supply;
pub mod trades;
pub mod types;

pub use authorizer::*;
pub use errors::*;
pub use ledger::*;
pub use params::*;
pub use rate::*;
pub use snapshot::*;
pub use supply::*;
pub use trades::*;
pub use types::*;
