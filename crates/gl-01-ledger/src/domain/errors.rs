//! Ledger error types.

use shared_types::{Balance, ChainId, PoolId};
use thiserror::Error;

/// Ledger error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No pool with this id.
    #[error("Pool not found: {0}")]
    PoolNotFound(PoolId),

    /// Pool cannot cover the drawn gas cost.
    #[error("Insufficient balance in pool {pool_id}: need {required}, have {available}")]
    InsufficientBalance {
        pool_id: PoolId,
        required: u64,
        available: Balance,
    },

    /// Target chain is not in the pool's allow-list.
    #[error("Chain {chain} is not supported by pool {pool_id}")]
    ChainNotSupported { pool_id: PoolId, chain: ChainId },

    /// A big-integer update would overflow.
    #[error("Arithmetic overflow in pool {0}")]
    Overflow(PoolId),

    /// Gas range is empty or inverted.
    #[error("Invalid gas range: min {min} > max {max}")]
    InvalidGasRange { min: u64, max: u64 },
}
