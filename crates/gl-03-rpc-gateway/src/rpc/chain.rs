//! Chain JSON-RPC methods.
//!
//! Blocks are derived from their number, so any block up to the head can be
//! rebuilt on demand without keeping history.

use crate::domain::error::{ApiError, ApiResult};
use crate::node::NodeHandle;
use gl_02_chain_sim::{block_hash, build_block};
use primitive_types::H256;
use serde::Serialize;
use serde_json::Value;
use shared_types::codec::parse_hex_u64;
use shared_types::{Block, BlockNumber};
use tracing::instrument;

use super::raw_param;

/// `chain_getBlock` result: `{block: {header, extrinsics}}`.
#[derive(Debug, Clone, Serialize)]
pub struct SignedBlock {
    pub block: BlockBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockBody {
    pub header: Block,
    pub extrinsics: Vec<Value>,
}

/// Chain RPC methods handler
pub struct ChainRpc {
    node: NodeHandle,
}

impl ChainRpc {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }

    /// chain_getBlock - the head, or the block with the given hash.
    /// Unknown hashes yield `null`.
    #[instrument(skip(self))]
    pub fn get_block(&self, params: &Value) -> ApiResult<Option<SignedBlock>> {
        let head = self.node.head();
        let header = match raw_param(params, 0, "hash") {
            None => Some(head),
            Some(raw @ Value::String(_)) => {
                let hash: H256 = serde_json::from_value(raw.clone())
                    .map_err(|e| ApiError::invalid_params(format!("hash: {e}")))?;
                number_of(&hash)
                    .filter(|n| *n <= head.number)
                    .map(build_block)
            }
            Some(other) => {
                return Err(ApiError::invalid_params(format!(
                    "hash: expected string, got {other}"
                )))
            }
        };

        Ok(header.map(|header| SignedBlock {
            block: BlockBody {
                header,
                extrinsics: Vec::new(),
            },
        }))
    }

    /// chain_getBlockHash - hash of the given number, or of the head.
    #[instrument(skip(self))]
    pub fn get_block_hash(&self, params: &Value) -> ApiResult<H256> {
        let number = match raw_param(params, 0, "number") {
            None => self.node.head().number,
            Some(Value::Number(n)) => n
                .as_u64()
                .ok_or_else(|| ApiError::invalid_params(format!("number: {n}")))?,
            Some(Value::String(s)) => parse_hex_u64(s).map_err(ApiError::invalid_params)?,
            Some(other) => {
                return Err(ApiError::invalid_params(format!(
                    "number: expected hex string, got {other}"
                )))
            }
        };
        Ok(block_hash(number))
    }
}

/// Inverse of `block_hash`: a number fits in the low 8 bytes.
fn number_of(hash: &H256) -> Option<BlockNumber> {
    let bytes = hash.as_bytes();
    if bytes[..24].iter().any(|b| *b != 0) {
        return None;
    }
    Some(hash.to_low_u64_be())
}
