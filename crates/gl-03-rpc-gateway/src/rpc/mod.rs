//! RPC method handlers.
//!
//! Handlers are plain synchronous functions over the node state; each
//! read-modify-write happens inside one lock scope and never spans an
//! await point.

pub mod chain;
pub mod sponsorship;
pub mod state;
pub mod system;

pub use chain::ChainRpc;
pub use sponsorship::SponsorshipRpc;
pub use state::StateRpc;
pub use system::SystemRpc;

use crate::domain::config::ChainConfig;
use crate::domain::error::{ApiError, ApiResult};
use crate::node::NodeHandle;
use primitive_types::U256;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared_types::codec::{parse_amount, parse_hex_u64};
use shared_types::ChainId;

/// All RPC handlers
pub struct RpcHandlers {
    pub system: SystemRpc,
    pub chain: ChainRpc,
    pub state: StateRpc,
    pub sponsorship: SponsorshipRpc,
}

impl RpcHandlers {
    pub fn new(config: &ChainConfig, node: NodeHandle) -> Self {
        Self {
            system: SystemRpc::new(config.clone()),
            chain: ChainRpc::new(node.clone()),
            state: StateRpc,
            sponsorship: SponsorshipRpc::new(node),
        }
    }
}

/// Raw positional parameter.
///
/// Accepts an array (`[a, b]`), an object keyed by `name`, or a bare scalar
/// standing in for the first parameter. `null` counts as absent.
pub(crate) fn raw_param<'a>(params: &'a Value, index: usize, name: &str) -> Option<&'a Value> {
    let value = match params {
        Value::Array(arr) => arr.get(index),
        Value::Object(obj) => obj.get(name),
        Value::Null => None,
        scalar if index == 0 => Some(scalar),
        _ => None,
    };
    value.filter(|v| !v.is_null())
}

/// Typed optional parameter.
pub(crate) fn parse_param_optional<T: DeserializeOwned>(
    params: &Value,
    index: usize,
    name: &str,
) -> ApiResult<Option<T>> {
    raw_param(params, index, name)
        .map(|v| {
            serde_json::from_value(v.clone())
                .map_err(|e| ApiError::invalid_params(format!("{name}: {e}")))
        })
        .transpose()
}

/// Typed required parameter.
pub(crate) fn parse_param<T: DeserializeOwned>(
    params: &Value,
    index: usize,
    name: &str,
) -> ApiResult<T> {
    parse_param_optional(params, index, name)?
        .ok_or_else(|| ApiError::invalid_params(format!("missing parameter {name}")))
}

/// Chain id given as a number, a decimal string or a `0x` hex string.
pub(crate) fn parse_chain_param(params: &Value, index: usize, name: &str) -> ApiResult<ChainId> {
    let raw = raw_param(params, index, name)
        .ok_or_else(|| ApiError::invalid_params(format!("missing parameter {name}")))?;
    let id = match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if s.starts_with("0x") => parse_hex_u64(s).ok(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    id.and_then(|n| u32::try_from(n).ok())
        .map(ChainId)
        .ok_or_else(|| ApiError::invalid_params(format!("{name}: invalid chain id {raw}")))
}

/// Amount given as a decimal string, a `0x` hex string or a number.
pub(crate) fn parse_amount_param(
    params: &Value,
    index: usize,
    name: &str,
) -> ApiResult<Option<U256>> {
    let Some(raw) = raw_param(params, index, name) else {
        return Ok(None);
    };
    let amount = match raw {
        Value::Number(n) => n
            .as_u64()
            .map(U256::from)
            .ok_or_else(|| format!("{raw} is not an unsigned integer")),
        Value::String(s) => parse_amount(s),
        _ => Err(format!("{raw} is not an amount")),
    };
    amount
        .map(Some)
        .map_err(|e| ApiError::invalid_params(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_positional_and_named() {
        let positional = json!(["pool_1", 1000]);
        let named = json!({"poolId": "pool_1", "targetChain": 1000});
        for params in [positional, named] {
            let pool: String = parse_param(&params, 0, "poolId").unwrap();
            assert_eq!(pool, "pool_1");
            assert_eq!(
                parse_chain_param(&params, 1, "targetChain").unwrap(),
                ChainId(1000)
            );
        }
    }

    #[test]
    fn test_null_and_missing_are_absent() {
        let params = json!([null]);
        let value: Option<String> = parse_param_optional(&params, 0, "owner").unwrap();
        assert!(value.is_none());
        let missing: ApiResult<String> = parse_param(&Value::Null, 0, "poolId");
        assert_eq!(missing.unwrap_err().code, -32602);
    }

    #[test]
    fn test_bare_scalar_is_first_param() {
        let params = json!("pool_7");
        let pool: String = parse_param(&params, 0, "poolId").unwrap();
        assert_eq!(pool, "pool_7");
        assert!(raw_param(&params, 1, "limit").is_none());
    }

    #[test]
    fn test_chain_id_forms() {
        assert_eq!(
            parse_chain_param(&json!(["2000"]), 0, "c").unwrap(),
            ChainId(2000)
        );
        assert_eq!(
            parse_chain_param(&json!(["0x7d0"]), 0, "c").unwrap(),
            ChainId(2000)
        );
        assert!(parse_chain_param(&json!([-1]), 0, "c").is_err());
        assert!(parse_chain_param(&json!([true]), 0, "c").is_err());
    }

    #[test]
    fn test_amount_forms() {
        assert_eq!(
            parse_amount_param(&json!(["1000000000000000000000"]), 0, "a").unwrap(),
            Some(U256::from_dec_str("1000000000000000000000").unwrap())
        );
        assert_eq!(
            parse_amount_param(&json!([500]), 0, "a").unwrap(),
            Some(U256::from(500u64))
        );
        assert_eq!(parse_amount_param(&json!([]), 0, "a").unwrap(), None);
        assert!(parse_amount_param(&json!(["-5"]), 0, "a").is_err());
    }
}
