//! State JSON-RPC stubs.
//!
//! The simulator has no runtime storage. Both methods answer with an opaque
//! random value of the right shape.

use primitive_types::H256;
use serde_json::Value;
use shared_types::codec::random_hash;
use tracing::{instrument, trace};

/// State RPC methods handler
pub struct StateRpc;

impl StateRpc {
    /// state_getStorage
    #[instrument(skip(self))]
    pub fn get_storage(&self, params: &Value) -> H256 {
        trace!("Synthesised storage value");
        random_hash()
    }

    /// state_call
    #[instrument(skip(self))]
    pub fn call(&self, params: &Value) -> H256 {
        trace!("Synthesised runtime call result");
        random_hash()
    }
}
