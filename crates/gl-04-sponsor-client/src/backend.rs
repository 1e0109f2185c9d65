//! Sponsorship backends.
//!
//! The session talks to exactly one [`SponsorBackend`] at a time: the JSON-RPC
//! node client when the handshake succeeds, the local simulator otherwise.
//! Nothing above this module branches on which one is active; the operating
//! mode is reported by the backend itself.

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shared_types::{
    methods, AccountId, ChainId, ConnectionMode, PoolId, RpcRequest, RpcResponse, SponsorReceipt,
    SystemHealth,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use crate::config::LatencyRange;
use crate::error::{ClientError, ClientResult};

/// Inclusive range of synthetic savings per simulated transaction.
pub const SIMULATED_SAVINGS: std::ops::RangeInclusive<u64> = 5..=54;

/// A signed sponsorship request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorRequest {
    pub pool_id: PoolId,
    pub target_chain: ChainId,
    pub call_data: Value,
    pub user: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl SponsorRequest {
    /// Bytes covered by the signature.
    pub fn signing_payload(&self) -> Vec<u8> {
        let body = json!({
            "poolId": self.pool_id,
            "targetChain": self.target_chain,
            "callData": self.call_data,
            "user": self.user,
        });
        body.to_string().into_bytes()
    }
}

/// What a backend reports for an included sponsorship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorOutcome {
    pub tx_hash: String,
    pub gas_saved: u64,
}

/// Identity reported by the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub chain: String,
    pub peers: u32,
}

#[async_trait]
pub trait SponsorBackend: Send + Sync {
    /// Whether answers are real ledger data.
    fn mode(&self) -> ConnectionMode;

    /// Verifies the backend is reachable.
    async fn handshake(&self) -> ClientResult<NodeInfo>;

    /// Submits a sponsorship and waits for inclusion.
    async fn sponsor(&self, request: &SponsorRequest) -> ClientResult<SponsorOutcome>;

    /// Total gas sponsored on behalf of `account`.
    async fn user_gas_savings(&self, account: &AccountId) -> ClientResult<u64>;
}

// =============================================================================
// JSON-RPC NODE CLIENT
// =============================================================================

/// JSON-RPC client for the node's HTTP endpoint.
pub struct RpcBackend {
    http_client: reqwest::Client,
    rpc_url: String,
    request_id: AtomicU64,
}

impl RpcBackend {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http_client,
            rpc_url: rpc_url.into(),
            request_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<R: DeserializeOwned>(&self, method: &str, params: Value) -> ClientResult<R> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(id, method, params);
        debug!(method, id, "RPC call");

        let response: RpcResponse = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?
            .json()
            .await?;

        let result = response.into_result()?;
        Ok(serde_json::from_value(result)?)
    }
}

#[async_trait]
impl SponsorBackend for RpcBackend {
    fn mode(&self) -> ConnectionMode {
        ConnectionMode::Blockchain
    }

    async fn handshake(&self) -> ClientResult<NodeInfo> {
        let chain: String = self.call(methods::SYSTEM_CHAIN, json!([])).await?;
        let health: SystemHealth = self.call(methods::SYSTEM_HEALTH, json!([])).await?;
        Ok(NodeInfo {
            chain,
            peers: health.peers,
        })
    }

    async fn sponsor(&self, request: &SponsorRequest) -> ClientResult<SponsorOutcome> {
        let params = serde_json::to_value(request)?;
        let receipt: SponsorReceipt = self
            .call(methods::SPONSORSHIP_SPONSOR_TRANSACTION, params)
            .await?;
        Ok(SponsorOutcome {
            tx_hash: format!("{:#x}", receipt.tx_hash),
            gas_saved: receipt.gas_cost,
        })
    }

    async fn user_gas_savings(&self, account: &AccountId) -> ClientResult<u64> {
        let total: String = self
            .call(methods::SPONSORSHIP_GET_USER_GAS_SAVINGS, json!([account]))
            .await?;
        total
            .parse()
            .map_err(|e| ClientError::network(format!("invalid savings total {total}: {e}")))
    }
}

// =============================================================================
// LOCAL SIMULATOR
// =============================================================================

/// Answers locally with seeded pseudo-random data.
pub struct SimulatedBackend {
    rng: Mutex<StdRng>,
    latency: LatencyRange,
    savings: Mutex<HashMap<AccountId, u64>>,
}

impl SimulatedBackend {
    pub fn new(seed: Option<u64>, latency: LatencyRange) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            latency,
            savings: Mutex::new(HashMap::new()),
        }
    }

    fn draw(&self) -> (Duration, u64, String) {
        let mut rng = self.rng.lock();
        let min = self.latency.min.as_millis() as u64;
        let max = (self.latency.max.as_millis() as u64).max(min);
        let delay = Duration::from_millis(rng.gen_range(min..=max));
        let gas = rng.gen_range(SIMULATED_SAVINGS);
        let mut hash = [0u8; 32];
        rng.fill_bytes(&mut hash);
        (delay, gas, format!("0x{}", hex::encode(hash)))
    }
}

#[async_trait]
impl SponsorBackend for SimulatedBackend {
    fn mode(&self) -> ConnectionMode {
        ConnectionMode::Fallback
    }

    async fn handshake(&self) -> ClientResult<NodeInfo> {
        Ok(NodeInfo {
            chain: "Simulated".to_string(),
            peers: 0,
        })
    }

    async fn sponsor(&self, request: &SponsorRequest) -> ClientResult<SponsorOutcome> {
        let (delay, gas_saved, tx_hash) = self.draw();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        *self.savings.lock().entry(request.user.clone()).or_default() += gas_saved;
        debug!(tx_hash = %tx_hash, gas_saved, "Simulated sponsorship");
        Ok(SponsorOutcome { tx_hash, gas_saved })
    }

    async fn user_gas_savings(&self, account: &AccountId) -> ClientResult<u64> {
        Ok(self.savings.lock().get(account).copied().unwrap_or(0))
    }
}
