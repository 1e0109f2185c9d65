//! # Client Session Against a Live Node
//!
//! ```text
//!   Session ──HTTP──▶ system_chain / system_health / sponsorTransaction
//!      │
//!      └──WS────▶ chain_subscribeNewHeads ──▶ NewHead events
//!                 (force-closed by the test ──▶ one reconnect)
//! ```

use super::fixtures::TestNode;
use async_trait::async_trait;
use gl_01_ledger::MissingPoolPolicy;
use gl_04_sponsor_client::{
    ClientResult, PushChannel, PushConnector, RpcBackend, Session, SessionConfig, SponsorParams,
    TransactionIssuer, WsConnector,
};
use serde_json::json;
use shared_bus::{EventFilter, EventKind, SessionEvent};
use shared_types::{ChainId, ConnectionMode, ConnectionState, PoolId, StreamSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const RECONNECT_DELAY: Duration = Duration::from_millis(300);

/// WebSocket connector whose open channels the test can sever.
struct KillSwitchConnector {
    kill: broadcast::Sender<()>,
}

impl KillSwitchConnector {
    fn new() -> Arc<Self> {
        let (kill, _) = broadcast::channel(4);
        Arc::new(Self { kill })
    }

    /// Closes every channel opened so far.
    fn sever(&self) {
        let _ = self.kill.send(());
    }
}

#[async_trait]
impl PushConnector for KillSwitchConnector {
    async fn connect(&self, endpoint: &str) -> ClientResult<Box<dyn PushChannel>> {
        let inner = WsConnector.connect(endpoint).await?;
        Ok(Box::new(KillableChannel {
            inner,
            kill: self.kill.subscribe(),
        }))
    }
}

struct KillableChannel {
    inner: Box<dyn PushChannel>,
    kill: broadcast::Receiver<()>,
}

#[async_trait]
impl PushChannel for KillableChannel {
    async fn send(&mut self, text: String) -> ClientResult<()> {
        self.inner.send(text).await
    }

    async fn recv(&mut self) -> Option<ClientResult<String>> {
        tokio::select! {
            _ = self.kill.recv() => None,
            frame = self.inner.recv() => frame,
        }
    }
}

fn session_config(node: &TestNode) -> SessionConfig {
    SessionConfig {
        endpoint: node.ws_url.clone(),
        rpc_endpoint: node.http_url.clone(),
        reconnect_delay: RECONNECT_DELAY,
        poll_probability: 0.0,
        seed: Some(5),
        ..SessionConfig::default()
    }
}

fn node_session(node: &TestNode, connector: Arc<KillSwitchConnector>) -> Session {
    let config = session_config(node);
    let backend = RpcBackend::new(config.rpc_endpoint.clone(), config.request_timeout);
    Session::builder(config)
        .remote(Arc::new(backend))
        .connector(connector)
        .build()
        .unwrap()
}

async fn wait_for_state(session: &Session, state: ConnectionState) {
    let mut rx = session.watch_state();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| *s == state))
        .await
        .expect("state reached in time")
        .unwrap();
}

fn params(pool: &str, chain: u32) -> SponsorParams {
    SponsorParams {
        pool_id: PoolId::from(pool),
        target_chain: ChainId(chain),
        call_data: json!({"method": "transfer", "amount": "1000"}),
    }
}

#[tokio::test]
async fn test_issuer_history_keeps_newest_hundred() {
    let session = Session::builder(SessionConfig {
        seed: Some(9),
        poll_probability: 0.0,
        ..SessionConfig::default()
    })
    .build()
    .unwrap();
    let issuer = TransactionIssuer::new(session.clone());

    let mut ids = Vec::new();
    for _ in 0..101 {
        let result = issuer.submit(params("demo-pool-1", 2000)).await;
        assert!(result.success);
        ids.push(result.transaction_id.unwrap());
    }

    assert_eq!(session.history_len(), 100);
    let history = session.history(100);
    assert!(history.iter().all(|entry| entry.record.id != ids[0]));
    assert_eq!(history[0].record.id, ids[100]);
    assert_eq!(history[99].record.id, ids[1]);
    assert_eq!(session.connection_info().mode, ConnectionMode::Fallback);

    session.disconnect();
}

#[tokio::test]
async fn test_session_sponsors_through_node() {
    let node = TestNode::start().await;
    let session = node_session(&node, KillSwitchConnector::new());
    let mut heads = session
        .events()
        .subscribe(EventFilter::kinds(vec![EventKind::NewHead]));

    let info = session.connect().await;
    assert_eq!(info.state, ConnectionState::Connected);
    assert_eq!(info.mode, ConnectionMode::Blockchain);
    assert_eq!(info.stream, StreamSource::Push);
    assert_eq!(info.chain.as_deref(), Some("MockChain"));

    let issuer = TransactionIssuer::new(session.clone());
    let result = issuer.submit(params("demo-pool-1", 2000)).await;
    assert!(result.success, "{:?}", result.error);
    assert!((50..=150).contains(&result.gas_saved));
    assert_eq!(result.tx_hash.len(), 66);

    let head = tokio::time::timeout(Duration::from_secs(5), heads.recv())
        .await
        .expect("head pushed")
        .unwrap();
    assert!(matches!(head, SessionEvent::NewHead { number } if number > 1000));

    assert_eq!(session.gas_savings(), result.gas_saved);
    assert_eq!(session.user_gas_savings().await.unwrap(), result.gas_saved);

    let pool = node.result("sponsorship_pools", json!(["demo-pool-1"])).await;
    let spent: u64 = pool["totalSpent"].as_str().unwrap().parse().unwrap();
    assert_eq!(spent, 250_000_000_000_000 + result.gas_saved);

    session.disconnect();
    node.stop().await;
}

#[tokio::test]
async fn test_node_rejections_surface_as_error_codes() {
    let node = TestNode::start_with(|config| {
        config.sponsorship.missing_pool = MissingPoolPolicy::Reject;
    })
    .await;
    let session = node_session(&node, KillSwitchConnector::new());
    session.connect().await;
    let issuer = TransactionIssuer::new(session.clone());

    let result = issuer.submit(params("no-such-pool", 2000)).await;
    assert!(!result.success);
    assert_eq!(
        result.error_code,
        Some(gl_04_sponsor_client::ErrorCode::PoolNotFound)
    );
    assert_eq!(session.history_len(), 0);

    session.disconnect();
    node.stop().await;
}

#[tokio::test]
async fn test_closed_push_channel_reconnects_once() {
    let node = TestNode::start().await;
    let connector = KillSwitchConnector::new();
    let session = node_session(&node, connector.clone());

    session.connect().await;
    assert_eq!(session.push_attempts(), 1);

    connector.sever();
    wait_for_state(&session, ConnectionState::Error).await;

    tokio::time::sleep(RECONNECT_DELAY / 2).await;
    assert_eq!(session.push_attempts(), 1);

    tokio::time::sleep(RECONNECT_DELAY).await;
    wait_for_state(&session, ConnectionState::Connected).await;
    assert_eq!(session.push_attempts(), 2);

    tokio::time::sleep(RECONNECT_DELAY * 3).await;
    assert_eq!(session.push_attempts(), 2);
    assert_eq!(session.connection_info().stream, StreamSource::Push);

    session.disconnect();
    node.stop().await;
}

#[tokio::test]
async fn test_disconnect_after_close_makes_no_attempt() {
    let node = TestNode::start().await;
    let connector = KillSwitchConnector::new();
    let session = node_session(&node, connector.clone());

    session.connect().await;
    connector.sever();
    session.disconnect();

    tokio::time::sleep(RECONNECT_DELAY * 3).await;
    assert_eq!(session.push_attempts(), 1);
    assert_eq!(session.state(), ConnectionState::Disconnected);

    node.stop().await;
}
