//! # Core Domain Entities
//!
//! The sponsorship ledger as the node stores it and the RPC layer exposes it.
//!
//! ## Clusters
//!
//! - **Identity**: `PoolId`, `AccountId`, `ChainId`, `TransactionId`
//! - **Ledger**: `Pool`, `PoolConfig`, `SponsoredTransaction`
//! - **Chain**: `Block`, `Digest`
//! - **Results**: `PoolCreated`, `SponsorReceipt`, `HealthReport`

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{hex_u64, u256_dec};

pub use primitive_types::{H256, U256};

/// Big unsigned amount of gas or tokens.
pub type Balance = U256;

/// Monotonic block sequence number.
pub type BlockNumber = u64;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

// =============================================================================
// IDENTITY
// =============================================================================

/// Opaque, unique pool identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Account identifier (SS58 address in practice, opaque here).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Numeric parachain id of a target chain.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct ChainId(pub u32);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ChainId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Identifier of a sponsored transaction (`tx_<seq>` on the node).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// LEDGER
// =============================================================================

/// Spending policy attached to a pool.
///
/// `allowed_chains` and `authorization_required` are stored and returned but
/// only evaluated when the node's sponsorship policy says so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    #[serde(with = "u256_dec")]
    pub max_transaction_value: Balance,
    #[serde(with = "u256_dec")]
    pub daily_spending_limit: Balance,
    #[serde(default)]
    pub allowed_chains: BTreeSet<ChainId>,
    #[serde(default)]
    pub authorization_required: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_transaction_value: U256::from(100_000_000_000_000u64),
            daily_spending_limit: U256::from(500_000_000_000_000u64),
            allowed_chains: [ChainId(1000), ChainId(2000)].into_iter().collect(),
            authorization_required: false,
        }
    }
}

impl PoolConfig {
    pub fn allows(&self, chain: ChainId) -> bool {
        self.allowed_chains.contains(&chain)
    }
}

/// Lifecycle status of a pool. Pools are never deleted in-session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PoolStatus {
    #[default]
    Active,
    Paused,
    Closed,
}

/// A prepaid balance from which sponsored gas is deducted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    pub owner: AccountId,
    #[serde(with = "u256_dec")]
    pub balance: Balance,
    #[serde(with = "u256_dec")]
    pub total_spent: Balance,
    #[serde(with = "u256_dec")]
    pub total_deposited: Balance,
    pub created_at: BlockNumber,
    #[serde(default)]
    pub status: PoolStatus,
    pub config: PoolConfig,
}

impl Pool {
    /// A fresh pool: full balance, nothing spent.
    pub fn new(
        id: PoolId,
        owner: AccountId,
        deposit: Balance,
        config: PoolConfig,
        created_at: BlockNumber,
    ) -> Self {
        Self {
            id,
            owner,
            balance: deposit,
            total_spent: U256::zero(),
            total_deposited: deposit,
            created_at,
            status: PoolStatus::Active,
            config,
        }
    }

    /// `balance + total_spent == total_deposited`.
    pub fn is_conserved(&self) -> bool {
        self.balance
            .checked_add(self.total_spent)
            .is_some_and(|sum| sum == self.total_deposited)
    }
}

/// Status of a sponsored transaction.
///
/// The simulator only ever records `Executed`; the other states exist for
/// clients talking to a real chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Dispatched,
    Executed,
    Failed,
    Refunded,
}

/// Append-only server-side record of one sponsorship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsoredTransaction {
    pub id: TransactionId,
    pub pool_id: PoolId,
    pub target_chain: ChainId,
    pub call_data: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AccountId>,
    pub gas_cost: u64,
    pub status: TransactionStatus,
    pub tx_hash: H256,
    pub block_number: BlockNumber,
    pub timestamp: Timestamp,
}

// =============================================================================
// CHAIN
// =============================================================================

/// Header digest. Always empty in the simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Digest {
    #[serde(default)]
    pub logs: Vec<String>,
}

/// A block header as pushed to `chain_newHead` subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(with = "hex_u64")]
    pub number: BlockNumber,
    pub parent_hash: H256,
    pub state_root: H256,
    pub extrinsics_root: H256,
    #[serde(default)]
    pub digest: Digest,
}

// =============================================================================
// RESULTS
// =============================================================================

/// Result of `sponsorship_createPool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolCreated {
    pub pool_id: PoolId,
    pub tx_hash: H256,
}

/// Result of `sponsorship_sponsorTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorReceipt {
    pub transaction_id: TransactionId,
    pub tx_hash: H256,
    pub gas_cost: u64,
    pub status: TransactionStatus,
}

/// Result of `sponsorship_fundPool`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolFunded {
    pub pool_id: PoolId,
    #[serde(with = "u256_dec")]
    pub new_balance: Balance,
    pub tx_hash: H256,
}

/// Result of `system_health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub peers: u32,
    pub is_syncing: bool,
    pub should_have_peers: bool,
}

/// Body of the `GET /health` probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub chain: String,
    pub block_number: BlockNumber,
    pub pools: usize,
    pub transactions: usize,
}
