use crate::types::{Count, Pool};
use scalar_types::{AccountId, Wei};
use thiserror::Error;

/// Errors raised by the tariff engine. Every error aborts the call with no
/// counter changed.
#[derive(Debug, Error)]
pub enum TariffError {
    #[error("count must be a positive integer")]
    InvalidCount,

    #[error("insufficient payment: required={required} wei, supplied={supplied} wei")]
    InsufficientPayment { required: Wei, supplied: Wei },

    #[error("{pool} pool capacity exceeded: requested={requested}, remaining={remaining}")]
    CapacityExceeded {
        pool: Pool,
        requested: Count,
        remaining: Count,
    },

    #[error("caller {caller} is not authorized for this operation")]
    Unauthorized { caller: AccountId },

    #[error("invalid tariff configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    #[error("{pool} issue plan is stale: planned from {planned_from}, counter is at {current}")]
    StalePlan {
        pool: Pool,
        planned_from: Count,
        current: Count,
    },

    #[error("snapshot rejected: {0}")]
    CorruptSnapshot(String),

    #[error("ownership ledger refused assignment: {0}")]
    Ledger(#[from] anyhow::Error),
}

impl TariffError {
    /// Short stable label, used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TariffError::InvalidCount => "invalid_count",
            TariffError::InsufficientPayment { .. } => "insufficient_payment",
            TariffError::CapacityExceeded { .. } => "capacity_exceeded",
            TariffError::Unauthorized { .. } => "unauthorized",
            TariffError::InvalidConfig(_) => "invalid_config",
            TariffError::ArithmeticOverflow(_) => "arithmetic_overflow",
            TariffError::StalePlan { .. } => "stale_plan",
            TariffError::CorruptSnapshot(_) => "corrupt_snapshot",
            TariffError::Ledger(_) => "ledger",
        }
    }
}

pub type Result<T> = std::result::Result<T, TariffError>;
