//! # JSON-RPC Wire Envelopes
//!
//! Request, response and push-notification shapes shared by the gateway and
//! the client, plus the method names and error codes of the GasLeap surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol version tag carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC error codes.
pub mod codes {
    /// Invalid JSON was received by the server.
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;
    /// The method does not exist.
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters.
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;

    // Domain errors (-32000 to -32099)
    pub const POOL_NOT_FOUND: i32 = -32001;
    pub const LIMIT_EXCEEDED: i32 = -32002;
    pub const INSUFFICIENT_BALANCE: i32 = -32003;
    pub const CHAIN_NOT_SUPPORTED: i32 = -32004;
}

/// Method names served by the node.
pub mod methods {
    pub const SYSTEM_NAME: &str = "system_name";
    pub const SYSTEM_VERSION: &str = "system_version";
    pub const SYSTEM_CHAIN: &str = "system_chain";
    pub const SYSTEM_HEALTH: &str = "system_health";

    pub const CHAIN_GET_BLOCK: &str = "chain_getBlock";
    pub const CHAIN_GET_BLOCK_HASH: &str = "chain_getBlockHash";
    pub const CHAIN_SUBSCRIBE_NEW_HEAD: &str = "chain_subscribeNewHead";
    pub const CHAIN_SUBSCRIBE_NEW_HEADS: &str = "chain_subscribeNewHeads";
    pub const CHAIN_UNSUBSCRIBE_NEW_HEAD: &str = "chain_unsubscribeNewHead";
    pub const CHAIN_UNSUBSCRIBE_NEW_HEADS: &str = "chain_unsubscribeNewHeads";
    /// Method name carried by pushed head notifications.
    pub const CHAIN_NEW_HEAD: &str = "chain_newHead";

    pub const STATE_GET_STORAGE: &str = "state_getStorage";
    pub const STATE_CALL: &str = "state_call";

    pub const SPONSORSHIP_POOLS: &str = "sponsorship_pools";
    pub const SPONSORSHIP_CREATE_POOL: &str = "sponsorship_createPool";
    pub const SPONSORSHIP_SPONSOR_TRANSACTION: &str = "sponsorship_sponsorTransaction";
    pub const SPONSORSHIP_GET_POOL: &str = "sponsorship_getPool";
    pub const SPONSORSHIP_FUND_POOL: &str = "sponsorship_fundPool";
    pub const SPONSORSHIP_GET_POOLS_BY_OWNER: &str = "sponsorship_getPoolsByOwner";
    pub const SPONSORSHIP_GET_TRANSACTION_HISTORY: &str = "sponsorship_getTransactionHistory";
    pub const SPONSORSHIP_GET_USER_GAS_SAVINGS: &str = "sponsorship_getUserGasSavings";
    pub const SPONSORSHIP_ESTIMATE_GAS_COST: &str = "sponsorship_estimateGasCost";
}

/// An incoming call. `id` is `Null` for notifications or when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

impl RpcRequest {
    pub fn new(id: impl Into<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// Error object inside a failed response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Either `result` or `error`, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RpcOutcome {
    Error { error: RpcErrorObject },
    Result { result: Value },
}

/// `{jsonrpc, id, result}` or `{jsonrpc, id, error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(flatten)]
    pub outcome: RpcOutcome,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: RpcOutcome::Result { result },
        }
    }

    pub fn failure(id: Value, error: RpcErrorObject) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            outcome: RpcOutcome::Error { error },
        }
    }

    pub fn into_result(self) -> Result<Value, RpcErrorObject> {
        match self.outcome {
            RpcOutcome::Result { result } => Ok(result),
            RpcOutcome::Error { error } => Err(error),
        }
    }
}

/// Parameters of a pushed notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionParams {
    pub subscription: String,
    pub result: Value,
}

/// Server push: `{jsonrpc, method, params: {subscription, result}}`, no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: SubscriptionParams,
}

impl SubscriptionNotification {
    pub fn new(method: &str, subscription: &str, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.to_string(),
            params: SubscriptionParams {
                subscription: subscription.to_string(),
                result,
            },
        }
    }
}
