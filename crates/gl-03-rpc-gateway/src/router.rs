//! JSON-RPC dispatch.
//!
//! One router serves both transports. The WebSocket handler passes a
//! [`PushContext`] so subscribe methods can reach the caller's outbound
//! queue; over HTTP they fail with `-32600`. A subscription created here
//! stays pending until the caller has queued the reply.

use crate::domain::error::{ApiError, ApiResult};
use crate::domain::methods::{get_method_info, MethodTransport, SubscriptionTopic};
use crate::domain::ConnectionId;
use crate::rpc::{parse_param, RpcHandlers};
use crate::ws::{Outbound, SubscribeError, SubscriptionRegistry};
use gl_telemetry::metrics::record_rpc;
use serde::Serialize;
use serde_json::Value;
use shared_types::rpc::methods::*;
use shared_types::{RpcRequest, RpcResponse};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Longest accepted string id.
const MAX_ID_LENGTH: usize = 256;

/// Caller side of a push-capable connection.
#[derive(Clone)]
pub struct PushContext {
    pub connection_id: ConnectionId,
    pub outbound: Outbound,
    pub registry: Arc<SubscriptionRegistry>,
}

/// Routes method names to handlers.
pub struct RpcRouter {
    handlers: RpcHandlers,
}

impl RpcRouter {
    pub fn new(handlers: RpcHandlers) -> Self {
        Self { handlers }
    }

    /// Handles a raw body: a single request or a batch.
    pub fn handle_text(&self, body: &str, push: Option<&PushContext>) -> Value {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => self.handle_value(value, push),
            Err(e) => {
                debug!(error = %e, "Unparseable request body");
                failure(Value::Null, ApiError::parse_error(e.to_string()))
            }
        }
    }

    /// Handles an already parsed body.
    pub fn handle_value(&self, value: Value, push: Option<&PushContext>) -> Value {
        match value {
            Value::Array(requests) if requests.is_empty() => {
                failure(Value::Null, ApiError::invalid_request("empty batch"))
            }
            Value::Array(requests) => Value::Array(
                requests
                    .into_iter()
                    .map(|req| self.process_single_request(req, push))
                    .collect(),
            ),
            single => self.process_single_request(single, push),
        }
    }

    fn process_single_request(&self, request: Value, push: Option<&PushContext>) -> Value {
        let id = request.get("id").cloned().unwrap_or(Value::Null);
        if let Err(e) = validate_id(&id) {
            return failure(Value::Null, e);
        }

        let request: RpcRequest = match serde_json::from_value(request) {
            Ok(req) => req,
            Err(e) => return failure(id, ApiError::invalid_request(e.to_string())),
        };

        match self.call(&request.method, &request.params, push) {
            Ok(result) => to_value(RpcResponse::success(id, result)),
            Err(e) => failure(id, e),
        }
    }

    /// Calls one method. A panicking handler yields `-32603`; the
    /// connection stays up.
    pub fn call(&self, method: &str, params: &Value, push: Option<&PushContext>) -> ApiResult<Value> {
        let outcome = catch_unwind(AssertUnwindSafe(|| self.route_method(method, params, push)))
            .unwrap_or_else(|panic| {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "handler panicked".to_string());
                error!(method = %method, reason = %reason, "RPC handler panicked");
                Err(ApiError::internal(reason))
            });

        // Unknown names share one label so arbitrary input can't grow the
        // metric's cardinality.
        let label = get_method_info(method).map_or("unknown", |m| m.name);
        record_rpc(label, outcome.is_ok());
        if let Err(e) = &outcome {
            debug!(method = %method, code = e.code, message = %e.message, "RPC call failed");
        }
        outcome
    }

    fn route_method(&self, method: &str, params: &Value, push: Option<&PushContext>) -> ApiResult<Value> {
        let info = get_method_info(method).ok_or_else(|| ApiError::method_not_found(method))?;

        if info.transport == MethodTransport::WebSocketOnly {
            let Some(push) = push else {
                return Err(ApiError::invalid_request(format!(
                    "{method} requires a WebSocket connection"
                )));
            };
            return self.route_push(method, params, push);
        }

        let h = &self.handlers;
        match method {
            // System
            SYSTEM_NAME => json(h.system.name()),
            SYSTEM_VERSION => json(h.system.version()),
            SYSTEM_CHAIN => json(h.system.chain()),
            SYSTEM_HEALTH => json(h.system.health()),

            // Chain
            CHAIN_GET_BLOCK => json(h.chain.get_block(params)?),
            CHAIN_GET_BLOCK_HASH => json(h.chain.get_block_hash(params)?),

            // State
            STATE_GET_STORAGE => json(h.state.get_storage(params)),
            STATE_CALL => json(h.state.call(params)),

            // Sponsorship
            SPONSORSHIP_POOLS | SPONSORSHIP_GET_POOL => json(h.sponsorship.pool(params)?),
            SPONSORSHIP_CREATE_POOL => json(h.sponsorship.create_pool(params)?),
            SPONSORSHIP_SPONSOR_TRANSACTION => json(h.sponsorship.sponsor_transaction(params)?),
            SPONSORSHIP_FUND_POOL => json(h.sponsorship.fund_pool(params)?),
            SPONSORSHIP_GET_POOLS_BY_OWNER => json(h.sponsorship.pools_by_owner(params)?),
            SPONSORSHIP_GET_TRANSACTION_HISTORY => {
                json(h.sponsorship.transaction_history(params)?)
            }
            SPONSORSHIP_GET_USER_GAS_SAVINGS => json(h.sponsorship.user_gas_savings(params)?),
            SPONSORSHIP_ESTIMATE_GAS_COST => json(h.sponsorship.estimate_gas_cost(params)?),

            _ => Err(ApiError::method_not_found(method)),
        }
    }

    fn route_push(&self, method: &str, params: &Value, push: &PushContext) -> ApiResult<Value> {
        if let Some(topic) = SubscriptionTopic::for_subscribe(method) {
            let id = push
                .registry
                .subscribe_pending(push.connection_id, topic, push.outbound.clone())
                .map_err(|e| match e {
                    SubscribeError::TooManySubscriptions(max) => ApiError::with_data(
                        shared_types::rpc::codes::LIMIT_EXCEEDED,
                        format!("Limit exceeded: {e}"),
                        serde_json::json!({ "max": max }),
                    ),
                })?;
            return Ok(Value::String(id));
        }

        if SubscriptionTopic::for_unsubscribe(method).is_some() {
            let id: String = parse_param(params, 0, "subscription")?;
            let removed = push.registry.unsubscribe_owned(&push.connection_id, &id);
            if !removed {
                debug!(subscription_id = %id, "Unsubscribe for unknown subscription");
            }
            return Ok(Value::Bool(removed));
        }

        Err(ApiError::method_not_found(method))
    }
}

fn validate_id(id: &Value) -> ApiResult<()> {
    match id {
        Value::Null | Value::Number(_) => Ok(()),
        Value::String(s) if s.len() > MAX_ID_LENGTH => Err(ApiError::invalid_request(format!(
            "id string too long (max {MAX_ID_LENGTH} chars)"
        ))),
        Value::String(_) => Ok(()),
        _ => Err(ApiError::invalid_request("id must be string or number")),
    }
}

fn json<T: Serialize>(value: T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::internal(e.to_string()))
}

fn failure(id: Value, error: ApiError) -> Value {
    to_value(RpcResponse::failure(id, error.into_object()))
}

fn to_value(response: RpcResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to encode response");
        serde_json::json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": { "code": -32603, "message": "Internal error: response encoding" }
        })
    })
}
