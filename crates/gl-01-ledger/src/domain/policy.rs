//! Sponsorship policy.
//!
//! The gas range plus three switches for how `sponsor()` treats requests the
//! pool cannot (or may not) pay for.

use serde::{Deserialize, Serialize};

use super::errors::LedgerError;

/// What to do when the drawn gas cost exceeds the pool balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientBalancePolicy {
    /// Fail with `InsufficientBalance`; nothing is recorded.
    #[default]
    Reject,
    /// Charge whatever is left, down to zero.
    Saturate,
}

/// What to do when the pool id is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingPoolPolicy {
    /// Fail with `PoolNotFound`.
    Reject,
    /// Record the transaction without touching any balance.
    #[default]
    RecordOnly,
}

/// Gas range and failure handling for sponsored transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SponsorshipPolicy {
    /// Smallest gas cost drawn (inclusive).
    pub gas_cost_min: u64,
    /// Largest gas cost drawn (inclusive).
    pub gas_cost_max: u64,
    pub insufficient_balance: InsufficientBalancePolicy,
    pub missing_pool: MissingPoolPolicy,
    /// Reject chains missing from the pool's `allowedChains`.
    pub enforce_allowed_chains: bool,
}

impl Default for SponsorshipPolicy {
    fn default() -> Self {
        Self {
            gas_cost_min: 50,
            gas_cost_max: 150,
            insufficient_balance: InsufficientBalancePolicy::Reject,
            missing_pool: MissingPoolPolicy::RecordOnly,
            enforce_allowed_chains: false,
        }
    }
}

impl SponsorshipPolicy {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.gas_cost_min > self.gas_cost_max || self.gas_cost_max == 0 {
            return Err(LedgerError::InvalidGasRange {
                min: self.gas_cost_min,
                max: self.gas_cost_max,
            });
        }
        Ok(())
    }

    /// Midpoint of the gas range, used for cost estimates.
    pub fn estimate(&self) -> u64 {
        self.gas_cost_min + (self.gas_cost_max - self.gas_cost_min) / 2
    }
}
