//! Shared node state.
//!
//! The ledger and the chain head live behind one lock. Every head
//! increment, from the block timer or from `sponsorTransaction`, publishes
//! the new block to subscribers before the lock is released, so each
//! subscription sees heads in order and without gaps.

use gl_01_ledger::{LedgerError, LedgerStore, SponsorRequest};
use gl_02_chain_sim::{ChainHead, ChainState};
use gl_telemetry::{CHAIN_HEAD, SPONSORED_TRANSACTIONS};
use parking_lot::Mutex;
use shared_types::{Block, SponsoredTransaction};
use std::sync::Arc;

use crate::ws::SubscriptionRegistry;

/// Ledger plus chain head.
pub struct NodeState {
    pub ledger: LedgerStore,
    pub chain: ChainState,
}

/// Cheap, cloneable handle to the node state.
#[derive(Clone)]
pub struct NodeHandle {
    state: Arc<Mutex<NodeState>>,
    subscriptions: Arc<SubscriptionRegistry>,
}

impl NodeHandle {
    pub fn new(
        ledger: LedgerStore,
        chain: ChainState,
        subscriptions: Arc<SubscriptionRegistry>,
    ) -> Self {
        CHAIN_HEAD.set(chain.number() as f64);
        Self {
            state: Arc::new(Mutex::new(NodeState { ledger, chain })),
            subscriptions,
        }
    }

    /// Runs `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&NodeState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Runs `f` with exclusive access. `f` must not advance the chain;
    /// use [`advance`](Self::advance) or [`sponsor`](Self::sponsor).
    pub fn write<R>(&self, f: impl FnOnce(&mut NodeState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn subscriptions(&self) -> &Arc<SubscriptionRegistry> {
        &self.subscriptions
    }

    pub fn head(&self) -> Block {
        self.read(|s| s.chain.head().clone())
    }

    /// Advances the head by one block and notifies subscribers.
    pub fn advance(&self) -> Block {
        let mut state = self.state.lock();
        let block = state.chain.advance();
        self.subscriptions.publish_head(&block);
        CHAIN_HEAD.set(block.number as f64);
        block
    }

    /// Records a sponsored transaction in the next block and advances the
    /// head to it.
    ///
    /// Ledger check, charge and head increment happen under one lock. On
    /// error the head does not move.
    pub fn sponsor(&self, request: SponsorRequest) -> Result<SponsoredTransaction, LedgerError> {
        let mut state = self.state.lock();
        let number = state.chain.next_number();
        let tx = state.ledger.sponsor(request, number)?;
        let block = state.chain.advance();
        self.subscriptions.publish_head(&block);

        SPONSORED_TRANSACTIONS.inc();
        CHAIN_HEAD.set(block.number as f64);
        Ok(tx)
    }
}

impl ChainHead for NodeHandle {
    fn advance_head(&self) -> Block {
        self.advance()
    }
}
