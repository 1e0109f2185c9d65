//! Test doubles: a scripted node backend and an in-memory push connector.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{AccountId, ConnectionMode};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::{NodeInfo, SponsorBackend, SponsorOutcome, SponsorRequest};
use crate::error::{ClientError, ClientResult, ErrorCode};
use crate::transport::{PushChannel, PushConnector};

/// Backend that answers like a reachable node.
pub struct StubNode {
    pub gas: u64,
    pub delay: Duration,
    pub handshake_delay: Duration,
    pub handshake_ok: bool,
    pub failure: Option<ErrorCode>,
    pub handshakes: AtomicUsize,
    pub requests: Mutex<Vec<SponsorRequest>>,
}

impl StubNode {
    pub fn new() -> Self {
        Self {
            gas: 100,
            delay: Duration::ZERO,
            handshake_delay: Duration::ZERO,
            handshake_ok: true,
            failure: None,
            handshakes: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            handshake_ok: false,
            ..Self::new()
        }
    }
}

#[async_trait]
impl SponsorBackend for StubNode {
    fn mode(&self) -> ConnectionMode {
        ConnectionMode::Blockchain
    }

    async fn handshake(&self) -> ClientResult<NodeInfo> {
        self.handshakes.fetch_add(1, Ordering::SeqCst);
        if !self.handshake_delay.is_zero() {
            tokio::time::sleep(self.handshake_delay).await;
        }
        if self.handshake_ok {
            Ok(NodeInfo {
                chain: "MockChain".to_string(),
                peers: 3,
            })
        } else {
            Err(ClientError::network("connection refused"))
        }
    }

    async fn sponsor(&self, request: &SponsorRequest) -> ClientResult<SponsorOutcome> {
        self.requests.lock().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(code) = self.failure {
            return Err(ClientError::new(code, "rejected by node"));
        }
        Ok(SponsorOutcome {
            tx_hash: format!("0x{:064x}", self.requests.lock().len()),
            gas_saved: self.gas,
        })
    }

    async fn user_gas_savings(&self, _account: &AccountId) -> ClientResult<u64> {
        Ok(self.gas * self.requests.lock().len() as u64)
    }
}

/// Node side of an in-memory push channel. Dropping it closes the channel.
pub struct ServerEnd {
    pub to_client: mpsc::UnboundedSender<String>,
    pub from_client: mpsc::UnboundedReceiver<String>,
}

/// Connector whose channels are driven by the test.
pub struct ScriptedConnector {
    attempts: AtomicUsize,
    refuse: AtomicBool,
    endpoints: Mutex<Vec<String>>,
    servers: mpsc::UnboundedSender<ServerEnd>,
}

impl ScriptedConnector {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (servers, accepted) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            attempts: AtomicUsize::new(0),
            refuse: AtomicBool::new(false),
            endpoints: Mutex::new(Vec::new()),
            servers,
        });
        (connector, accepted)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn endpoints(&self) -> Vec<String> {
        self.endpoints.lock().clone()
    }
}

#[async_trait]
impl PushConnector for ScriptedConnector {
    async fn connect(&self, endpoint: &str) -> ClientResult<Box<dyn PushChannel>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.endpoints.lock().push(endpoint.to_string());
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ClientError::network("connection refused"));
        }

        let (to_client, inbound) = mpsc::unbounded_channel();
        let (outbound, from_client) = mpsc::unbounded_channel();
        let _ = self.servers.send(ServerEnd {
            to_client,
            from_client,
        });
        Ok(Box::new(ScriptedChannel { inbound, outbound }))
    }
}

struct ScriptedChannel {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl PushChannel for ScriptedChannel {
    async fn send(&mut self, text: String) -> ClientResult<()> {
        self.outbound
            .send(text)
            .map_err(|_| ClientError::connection_lost("server end dropped"))
    }

    async fn recv(&mut self) -> Option<ClientResult<String>> {
        self.inbound.recv().await.map(Ok)
    }
}
