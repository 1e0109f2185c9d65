//! # Ledger Store
//!
//! Arena of pools keyed by opaque id plus the sponsored transaction log.
//! All access goes through these methods; nothing else mutates a pool.

use std::collections::HashMap;

use primitive_types::U256;
use shared_types::codec::random_hash;
use shared_types::{
    AccountId, Balance, BlockNumber, ChainId, Pool, PoolConfig, PoolCreated, PoolFunded, PoolId,
    SponsoredTransaction, TransactionId, TransactionStatus,
};
use tracing::{debug, info, warn};

use super::errors::LedgerError;
use super::policy::{InsufficientBalancePolicy, MissingPoolPolicy, SponsorshipPolicy};
use crate::ports::{GasOracle, RandomGasOracle, SystemTimeSource, TimeSource};

/// Id of the pool seeded at node start.
pub const DEMO_POOL_ID: &str = "demo-pool-1";

/// Owner of the seeded pool and default owner for `createPool`.
pub const DEMO_OWNER: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

/// Default deposit for `createPool` when none is given.
pub const DEFAULT_DEPOSIT: u64 = 1_000_000_000_000_000;

/// Default page size for transaction history.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A request to sponsor one call on a target chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SponsorRequest {
    pub pool_id: PoolId,
    pub target_chain: ChainId,
    pub call_data: serde_json::Value,
    /// Account on whose behalf the call is made, if known.
    pub user: Option<AccountId>,
}

/// The pool table and the append-only transaction log.
pub struct LedgerStore {
    policy: SponsorshipPolicy,
    pools: HashMap<PoolId, Pool>,
    /// Pool ids in creation order.
    order: Vec<PoolId>,
    transactions: Vec<SponsoredTransaction>,
    next_pool: u64,
    next_tx: u64,
    gas: Box<dyn GasOracle>,
    clock: Box<dyn TimeSource>,
}

impl LedgerStore {
    /// Creates an empty store with random gas costs and the system clock.
    pub fn new(policy: SponsorshipPolicy) -> Self {
        Self::with_ports(
            policy,
            Box::new(RandomGasOracle::from_entropy()),
            Box::new(SystemTimeSource),
        )
    }

    /// Creates an empty store with explicit gas and time sources.
    pub fn with_ports(
        policy: SponsorshipPolicy,
        gas: Box<dyn GasOracle>,
        clock: Box<dyn TimeSource>,
    ) -> Self {
        Self {
            policy,
            pools: HashMap::new(),
            order: Vec::new(),
            transactions: Vec::new(),
            next_pool: 1,
            next_tx: 1,
            gas,
            clock,
        }
    }

    pub fn policy(&self) -> &SponsorshipPolicy {
        &self.policy
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Allocates a fresh pool with `balance = deposit`, `totalSpent = 0`.
    pub fn create_pool(
        &mut self,
        owner: AccountId,
        deposit: Balance,
        config: PoolConfig,
        at: BlockNumber,
    ) -> PoolCreated {
        let pool_id = self.allocate_pool_id();
        let pool = Pool::new(pool_id.clone(), owner, deposit, config, at);
        info!(pool_id = %pool_id, owner = %pool.owner, deposit = %deposit, "Pool created");
        self.order.push(pool_id.clone());
        self.pools.insert(pool_id.clone(), pool);
        PoolCreated {
            pool_id,
            tx_hash: random_hash(),
        }
    }

    /// Seeds `demo-pool-1` unless it already exists.
    pub fn seed_demo_pool(&mut self, at: BlockNumber) -> bool {
        let id = PoolId::from(DEMO_POOL_ID);
        if self.pools.contains_key(&id) {
            return false;
        }
        let spent = U256::from(250_000_000_000_000u64);
        let balance = U256::from(DEFAULT_DEPOSIT);
        let pool = Pool {
            id: id.clone(),
            owner: AccountId::from(DEMO_OWNER),
            balance,
            total_spent: spent,
            total_deposited: balance + spent,
            created_at: at,
            status: Default::default(),
            config: PoolConfig::default(),
        };
        self.order.push(id.clone());
        self.pools.insert(id, pool);
        debug!(pool_id = DEMO_POOL_ID, "Demo pool seeded");
        true
    }

    pub fn get_pool(&self, id: &PoolId) -> Option<&Pool> {
        self.pools.get(id)
    }

    /// Every pool, in creation order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.order.iter().filter_map(|id| self.pools.get(id))
    }

    /// Pools of one owner, in creation order.
    pub fn pools_by_owner(&self, owner: &AccountId) -> Vec<&Pool> {
        self.pools().filter(|p| &p.owner == owner).collect()
    }

    /// Adds `amount` to a pool's balance and total deposits.
    pub fn fund_pool(&mut self, id: &PoolId, amount: Balance) -> Result<PoolFunded, LedgerError> {
        let pool = self
            .pools
            .get_mut(id)
            .ok_or_else(|| LedgerError::PoolNotFound(id.clone()))?;

        let balance = pool
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(id.clone()))?;
        let deposited = pool
            .total_deposited
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(id.clone()))?;
        pool.balance = balance;
        pool.total_deposited = deposited;

        info!(pool_id = %id, amount = %amount, balance = %balance, "Pool funded");
        Ok(PoolFunded {
            pool_id: id.clone(),
            new_balance: balance,
            tx_hash: random_hash(),
        })
    }

    /// Records a sponsored transaction in block `block_number` and charges
    /// its gas cost to the pool.
    ///
    /// The balance check and both balance updates happen in this one call.
    /// On error nothing is recorded.
    pub fn sponsor(
        &mut self,
        request: SponsorRequest,
        block_number: BlockNumber,
    ) -> Result<SponsoredTransaction, LedgerError> {
        let drawn = self
            .gas
            .draw(self.policy.gas_cost_min, self.policy.gas_cost_max);

        let gas_cost = match self.pools.get_mut(&request.pool_id) {
            Some(pool) => charge(&self.policy, pool, request.target_chain, drawn)?,
            None => match self.policy.missing_pool {
                MissingPoolPolicy::Reject => {
                    return Err(LedgerError::PoolNotFound(request.pool_id))
                }
                MissingPoolPolicy::RecordOnly => {
                    warn!(pool_id = %request.pool_id, "Sponsoring against unknown pool; no balance charged");
                    drawn
                }
            },
        };

        let tx = SponsoredTransaction {
            id: TransactionId(format!("tx_{}", self.next_tx)),
            pool_id: request.pool_id,
            target_chain: request.target_chain,
            call_data: request.call_data,
            user: request.user,
            gas_cost,
            status: TransactionStatus::Executed,
            tx_hash: random_hash(),
            block_number,
            timestamp: self.clock.now(),
        };
        self.next_tx += 1;

        debug!(
            tx_id = %tx.id,
            pool_id = %tx.pool_id,
            chain = %tx.target_chain,
            gas_cost,
            block = block_number,
            "Transaction sponsored"
        );
        self.transactions.push(tx.clone());
        Ok(tx)
    }

    /// Most recent transactions of a pool first, at most `limit`.
    pub fn transaction_history(&self, pool_id: &PoolId, limit: usize) -> Vec<&SponsoredTransaction> {
        self.transactions
            .iter()
            .rev()
            .filter(|tx| &tx.pool_id == pool_id)
            .take(limit)
            .collect()
    }

    /// Sum of gas costs sponsored on behalf of `user`.
    pub fn user_gas_savings(&self, user: &AccountId) -> Balance {
        self.transactions
            .iter()
            .filter(|tx| tx.user.as_ref() == Some(user))
            .fold(U256::zero(), |acc, tx| acc.saturating_add(U256::from(tx.gas_cost)))
    }

    /// Expected gas cost of a call.
    pub fn estimate_gas_cost(&self) -> u64 {
        self.policy.estimate()
    }

    /// The whole log, oldest first.
    pub fn transactions(&self) -> &[SponsoredTransaction] {
        &self.transactions
    }

    fn allocate_pool_id(&mut self) -> PoolId {
        loop {
            let id = PoolId::new(format!("pool_{}", self.next_pool));
            self.next_pool += 1;
            if !self.pools.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Charges `drawn` to `pool` under `policy`; returns the amount charged.
fn charge(
    policy: &SponsorshipPolicy,
    pool: &mut Pool,
    chain: ChainId,
    drawn: u64,
) -> Result<u64, LedgerError> {
    if policy.enforce_allowed_chains && !pool.config.allows(chain) {
        return Err(LedgerError::ChainNotSupported {
            pool_id: pool.id.clone(),
            chain,
        });
    }

    let cost = U256::from(drawn);
    let charged = if pool.balance >= cost {
        drawn
    } else {
        match policy.insufficient_balance {
            InsufficientBalancePolicy::Reject => {
                return Err(LedgerError::InsufficientBalance {
                    pool_id: pool.id.clone(),
                    required: drawn,
                    available: pool.balance,
                })
            }
            // balance < drawn, so it fits in a u64
            InsufficientBalancePolicy::Saturate => pool.balance.low_u64(),
        }
    };

    let amount = U256::from(charged);
    let balance = pool
        .balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::Overflow(pool.id.clone()))?;
    let spent = pool
        .total_spent
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Overflow(pool.id.clone()))?;
    pool.balance = balance;
    pool.total_spent = spent;
    Ok(charged)
}
