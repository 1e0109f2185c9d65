//! Sponsorship JSON-RPC methods.
//!
//! Parameters are positional as the GasLeap pallet exposes them:
//!
//! | Method | Params |
//! |--------|--------|
//! | `sponsorship_pools` / `sponsorship_getPool` | `[poolId]` |
//! | `sponsorship_createPool` | `[owner?, initialDeposit?, config?]` |
//! | `sponsorship_sponsorTransaction` | `[poolId, targetChain, callData?, user?]` |
//! | `sponsorship_fundPool` | `[poolId, amount]` |
//! | `sponsorship_getPoolsByOwner` | `[owner]` |
//! | `sponsorship_getTransactionHistory` | `[poolId, limit?]` |
//! | `sponsorship_getUserGasSavings` | `[account]` |
//! | `sponsorship_estimateGasCost` | `[targetChain?, callData?]` |

use crate::domain::error::{ApiError, ApiResult};
use crate::node::NodeHandle;
use gl_01_ledger::{SponsorRequest, DEFAULT_DEPOSIT, DEFAULT_HISTORY_LIMIT, DEMO_OWNER};
use gl_telemetry::POOLS_CREATED;
use primitive_types::U256;
use serde_json::Value;
use shared_types::{
    AccountId, Pool, PoolConfig, PoolCreated, PoolFunded, PoolId, SponsorReceipt,
    SponsoredTransaction,
};
use tracing::instrument;

use super::{parse_amount_param, parse_chain_param, parse_param, parse_param_optional};

/// Sponsorship RPC methods handler
pub struct SponsorshipRpc {
    node: NodeHandle,
}

impl SponsorshipRpc {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }

    /// sponsorship_pools - the pool, or `null` when unknown
    #[instrument(skip(self))]
    pub fn pool(&self, params: &Value) -> ApiResult<Option<Pool>> {
        let Some(id) = parse_param_optional::<PoolId>(params, 0, "poolId")? else {
            return Ok(None);
        };
        Ok(self.node.read(|s| s.ledger.get_pool(&id).cloned()))
    }

    /// sponsorship_createPool
    #[instrument(skip(self))]
    pub fn create_pool(&self, params: &Value) -> ApiResult<PoolCreated> {
        let owner = parse_param_optional::<AccountId>(params, 0, "owner")?
            .unwrap_or_else(|| AccountId::from(DEMO_OWNER));
        let deposit = parse_amount_param(params, 1, "initialDeposit")?
            .unwrap_or_else(|| U256::from(DEFAULT_DEPOSIT));
        let config = parse_param_optional::<PoolConfig>(params, 2, "config")?.unwrap_or_default();

        let created = self.node.write(|s| {
            let at = s.chain.number();
            s.ledger.create_pool(owner, deposit, config, at)
        });
        POOLS_CREATED.inc();
        Ok(created)
    }

    /// sponsorship_sponsorTransaction
    #[instrument(skip(self))]
    pub fn sponsor_transaction(&self, params: &Value) -> ApiResult<SponsorReceipt> {
        let request = SponsorRequest {
            pool_id: parse_param(params, 0, "poolId")?,
            target_chain: parse_chain_param(params, 1, "targetChain")?,
            call_data: super::raw_param(params, 2, "callData")
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
            user: parse_param_optional(params, 3, "user")?,
        };

        let tx = self.node.sponsor(request)?;
        Ok(SponsorReceipt {
            transaction_id: tx.id,
            tx_hash: tx.tx_hash,
            gas_cost: tx.gas_cost,
            status: tx.status,
        })
    }

    /// sponsorship_fundPool
    #[instrument(skip(self))]
    pub fn fund_pool(&self, params: &Value) -> ApiResult<PoolFunded> {
        let id: PoolId = parse_param(params, 0, "poolId")?;
        let amount = parse_amount_param(params, 1, "amount")?
            .ok_or_else(|| ApiError::invalid_params("missing parameter amount"))?;
        Ok(self.node.write(|s| s.ledger.fund_pool(&id, amount))?)
    }

    /// sponsorship_getPoolsByOwner
    #[instrument(skip(self))]
    pub fn pools_by_owner(&self, params: &Value) -> ApiResult<Vec<Pool>> {
        let owner: AccountId = parse_param(params, 0, "owner")?;
        Ok(self.node.read(|s| {
            s.ledger
                .pools_by_owner(&owner)
                .into_iter()
                .cloned()
                .collect()
        }))
    }

    /// sponsorship_getTransactionHistory - newest first
    #[instrument(skip(self))]
    pub fn transaction_history(&self, params: &Value) -> ApiResult<Vec<SponsoredTransaction>> {
        let id: PoolId = parse_param(params, 0, "poolId")?;
        let limit = parse_param_optional::<usize>(params, 1, "limit")?
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self.node.read(|s| {
            s.ledger
                .transaction_history(&id, limit)
                .into_iter()
                .cloned()
                .collect()
        }))
    }

    /// sponsorship_getUserGasSavings - decimal string
    #[instrument(skip(self))]
    pub fn user_gas_savings(&self, params: &Value) -> ApiResult<String> {
        let account: AccountId = parse_param(params, 0, "account")?;
        Ok(self
            .node
            .read(|s| s.ledger.user_gas_savings(&account))
            .to_string())
    }

    /// sponsorship_estimateGasCost
    #[instrument(skip(self))]
    pub fn estimate_gas_cost(&self, params: &Value) -> ApiResult<u64> {
        if super::raw_param(params, 0, "targetChain").is_some() {
            parse_chain_param(params, 0, "targetChain")?;
        }
        Ok(self.node.read(|s| s.ledger.estimate_gas_cost()))
    }
}
