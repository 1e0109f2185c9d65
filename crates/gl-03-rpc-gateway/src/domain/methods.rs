//! Method table.
//!
//! Every method the node answers, with its category and the transport it
//! needs. Names missing here fail with `-32601`.

use shared_types::rpc::methods::*;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Method category for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodCategory {
    System,
    Chain,
    State,
    Sponsorship,
}

/// Transport a method can be called over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodTransport {
    /// HTTP and WebSocket
    Any,
    /// Needs a connection to push notifications to
    WebSocketOnly,
}

/// Method metadata
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: &'static str,
    pub category: MethodCategory,
    /// Mutates the ledger or the chain head
    pub is_write: bool,
    pub transport: MethodTransport,
    pub description: &'static str,
}

impl MethodInfo {
    const fn read(name: &'static str, category: MethodCategory, description: &'static str) -> Self {
        Self {
            name,
            category,
            is_write: false,
            transport: MethodTransport::Any,
            description,
        }
    }

    const fn write(name: &'static str, category: MethodCategory, description: &'static str) -> Self {
        Self {
            name,
            category,
            is_write: true,
            transport: MethodTransport::Any,
            description,
        }
    }

    const fn push(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            category: MethodCategory::Chain,
            is_write: false,
            transport: MethodTransport::WebSocketOnly,
            description,
        }
    }
}

static METHOD_REGISTRY: LazyLock<HashMap<&'static str, MethodInfo>> = LazyLock::new(|| {
    use MethodCategory::*;

    let methods = vec![
        // System
        MethodInfo::read(SYSTEM_NAME, System, "Node implementation name"),
        MethodInfo::read(SYSTEM_VERSION, System, "Node version"),
        MethodInfo::read(SYSTEM_CHAIN, System, "Chain name"),
        MethodInfo::read(SYSTEM_HEALTH, System, "Peer and sync status"),
        // Chain
        MethodInfo::read(CHAIN_GET_BLOCK, Chain, "Current head block"),
        MethodInfo::read(CHAIN_GET_BLOCK_HASH, Chain, "Hash of a block number"),
        MethodInfo::push(CHAIN_SUBSCRIBE_NEW_HEAD, "Subscribe to new heads"),
        MethodInfo::push(CHAIN_SUBSCRIBE_NEW_HEADS, "Subscribe to new heads"),
        MethodInfo::push(CHAIN_UNSUBSCRIBE_NEW_HEAD, "Cancel a head subscription"),
        MethodInfo::push(CHAIN_UNSUBSCRIBE_NEW_HEADS, "Cancel a head subscription"),
        // State
        MethodInfo::read(STATE_GET_STORAGE, State, "Opaque storage value"),
        MethodInfo::read(STATE_CALL, State, "Opaque runtime call"),
        // Sponsorship
        MethodInfo::read(SPONSORSHIP_POOLS, Sponsorship, "Pool by id or null"),
        MethodInfo::read(SPONSORSHIP_GET_POOL, Sponsorship, "Pool by id or null"),
        MethodInfo::write(SPONSORSHIP_CREATE_POOL, Sponsorship, "Create a pool"),
        MethodInfo::write(
            SPONSORSHIP_SPONSOR_TRANSACTION,
            Sponsorship,
            "Charge a call's gas to a pool",
        ),
        MethodInfo::write(SPONSORSHIP_FUND_POOL, Sponsorship, "Top up a pool"),
        MethodInfo::read(SPONSORSHIP_GET_POOLS_BY_OWNER, Sponsorship, "Pools of an owner"),
        MethodInfo::read(
            SPONSORSHIP_GET_TRANSACTION_HISTORY,
            Sponsorship,
            "Recent transactions of a pool",
        ),
        MethodInfo::read(
            SPONSORSHIP_GET_USER_GAS_SAVINGS,
            Sponsorship,
            "Gas sponsored for an account",
        ),
        MethodInfo::read(
            SPONSORSHIP_ESTIMATE_GAS_COST,
            Sponsorship,
            "Expected gas cost of a call",
        ),
    ];

    methods.into_iter().map(|m| (m.name, m)).collect()
});

/// Get method info by name
pub fn get_method_info(method: &str) -> Option<&'static MethodInfo> {
    METHOD_REGISTRY.get(method)
}

pub fn is_method_supported(method: &str) -> bool {
    METHOD_REGISTRY.contains_key(method)
}

pub fn is_write_method(method: &str) -> bool {
    METHOD_REGISTRY
        .get(method)
        .map(|m| m.is_write)
        .unwrap_or(false)
}

/// Every method of a category, sorted by name
pub fn get_methods_by_category(category: MethodCategory) -> Vec<&'static str> {
    let mut names: Vec<_> = METHOD_REGISTRY
        .values()
        .filter(|m| m.category == category)
        .map(|m| m.name)
        .collect();
    names.sort_unstable();
    names
}

/// Push topics served over WebSocket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionTopic {
    NewHeads,
}

impl SubscriptionTopic {
    /// Topic opened by a subscribe method.
    pub fn for_subscribe(method: &str) -> Option<Self> {
        match method {
            CHAIN_SUBSCRIBE_NEW_HEAD | CHAIN_SUBSCRIBE_NEW_HEADS => Some(Self::NewHeads),
            _ => None,
        }
    }

    /// Topic closed by an unsubscribe method.
    pub fn for_unsubscribe(method: &str) -> Option<Self> {
        match method {
            CHAIN_UNSUBSCRIBE_NEW_HEAD | CHAIN_UNSUBSCRIBE_NEW_HEADS => Some(Self::NewHeads),
            _ => None,
        }
    }

    /// Method name carried by notifications on this topic.
    pub fn notification_method(&self) -> &'static str {
        match self {
            Self::NewHeads => CHAIN_NEW_HEAD,
        }
    }
}
