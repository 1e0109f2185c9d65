//! # Session Manager
//!
//! Owns the connection to the node, the bound wallet, the cumulative savings
//! counter and the bounded history.
//!
//! ```text
//!   connect()
//!     │  Disconnected ─▶ Connecting
//!     ├─ handshake (retry with backoff) ── fails ──▶ simulator, polling ticker, Error
//!     └─ ok ─▶ node backend
//!          ├─ push channel opens ──▶ Connected, stream reader
//!          │      channel drops ──▶ Error, one reconnect after reconnect_delay
//!          └─ push channel fails ─▶ Connected, polling ticker
//! ```
//!
//! At most one reconnect is pending at any time, and `disconnect()` cancels
//! it together with the stream reader and the polling ticker.
//!
//! A session is an explicit object: create one per process (or per test),
//! clone the handle freely, and call `disconnect()` to tear it down.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_bus::{EventBus, EventPublisher, SavingsSource, SessionEvent};
use shared_types::{
    methods, ActivityMessage, ChainId, ConnectionMode, ConnectionState, PoolId, RecordStatus,
    RpcRequest, StreamSource, Timestamp, TransactionRecord,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::backend::{NodeInfo, RpcBackend, SimulatedBackend, SponsorBackend, SponsorOutcome};
use crate::config::SessionConfig;
use crate::error::{ClientError, ClientResult, ErrorCode};
use crate::history::{HistoryEntry, HistoryLedger, Trend};
use crate::transport::{PushChannel, PushConnector, PushFrame, WsConnector};
use crate::utils::{now_millis, retry_with_backoff};
use crate::wallet::{bind_wallet, Signer, WalletConnection};

/// App name presented to wallets when binding implicitly.
pub const DEFAULT_APP_NAME: &str = "GasLeap Demo";

/// Snapshot of the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    pub state: ConnectionState,
    pub is_connected: bool,
    pub endpoint: String,
    /// `Fallback` means every answer is synthesized locally.
    pub mode: ConnectionMode,
    /// `Polling` means live updates are synthetic.
    pub stream: StreamSource,
    pub chain: Option<String>,
    pub last_connected: Option<Timestamp>,
}

/// Summary of savings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasSavingsInfo {
    pub total_saved: u64,
    pub transaction_count: usize,
    pub average_per_transaction: u64,
    pub last_updated: Timestamp,
}

/// Savings with derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsWithUpdates {
    pub current: u64,
    pub trend: Trend,
    pub last_update: Timestamp,
    pub daily_average: f64,
    pub daily_total: u64,
    pub weekly_total: u64,
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    config: SessionConfig,
    remote: Option<Arc<dyn SponsorBackend>>,
    connector: Arc<dyn PushConnector>,
    signer: Option<Arc<dyn Signer>>,
}

impl SessionBuilder {
    /// Node backend to try on connect. Without one the session always runs
    /// on the simulator.
    pub fn remote(mut self, backend: Arc<dyn SponsorBackend>) -> Self {
        self.remote = Some(backend);
        self
    }

    pub fn no_remote(mut self) -> Self {
        self.remote = None;
        self
    }

    pub fn connector(mut self, connector: Arc<dyn PushConnector>) -> Self {
        self.connector = connector;
        self
    }

    /// External signer to try before the demo identity.
    pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn build(self) -> ClientResult<Session> {
        self.config.validate()?;

        let rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let simulator: Arc<dyn SponsorBackend> = Arc::new(SimulatedBackend::new(
            self.config.seed,
            self.config.simulated_latency,
        ));
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        let inner = Inner {
            core: Mutex::new(Core {
                endpoint: self.config.endpoint.clone(),
                backend: None,
                node: None,
                stream: StreamSource::None,
                subscription: None,
                wallet: None,
                savings: 0,
                last_connected: None,
            }),
            history: Mutex::new(HistoryLedger::new(self.config.history_capacity)),
            tasks: Mutex::new(Tasks::default()),
            config: self.config,
            remote: self.remote,
            simulator,
            connector: self.connector,
            external_signer: self.signer,
            bus: Arc::new(EventBus::new()),
            state_tx,
            push_attempts: AtomicU64::new(0),
            next_request: AtomicU64::new(1),
            next_record: AtomicU64::new(1),
            rng: Mutex::new(rng),
        };

        Ok(Session {
            inner: Arc::new(inner),
        })
    }
}

/// Client session handle. Clones share the same session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    config: SessionConfig,
    remote: Option<Arc<dyn SponsorBackend>>,
    simulator: Arc<dyn SponsorBackend>,
    connector: Arc<dyn PushConnector>,
    external_signer: Option<Arc<dyn Signer>>,
    bus: Arc<EventBus>,
    state_tx: watch::Sender<ConnectionState>,
    core: Mutex<Core>,
    history: Mutex<HistoryLedger>,
    tasks: Mutex<Tasks>,
    push_attempts: AtomicU64,
    next_request: AtomicU64,
    next_record: AtomicU64,
    rng: Mutex<StdRng>,
}

struct Core {
    endpoint: String,
    backend: Option<Arc<dyn SponsorBackend>>,
    node: Option<NodeInfo>,
    stream: StreamSource,
    subscription: Option<String>,
    wallet: Option<(WalletConnection, Arc<dyn Signer>)>,
    savings: u64,
    last_connected: Option<Timestamp>,
}

#[derive(Default)]
struct Tasks {
    /// Set by `disconnect()`; nothing new is scheduled while set.
    closed: bool,
    stream: Option<JoinHandle<()>>,
    reconnect: Option<JoinHandle<()>>,
    poller: Option<JoinHandle<()>>,
}

impl Tasks {
    fn stop_tracking(&mut self) -> bool {
        let mut stopped = false;
        for handle in [self.stream.take(), self.reconnect.take(), self.poller.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
            stopped = true;
        }
        stopped
    }
}

impl Session {
    /// Session against the node at `config.rpc_endpoint` / `config.endpoint`.
    pub fn new(config: SessionConfig) -> ClientResult<Self> {
        let remote = Arc::new(RpcBackend::new(
            config.rpc_endpoint.clone(),
            config.request_timeout,
        ));
        Self::builder(config).remote(remote).build()
    }

    pub fn builder(config: SessionConfig) -> SessionBuilder {
        SessionBuilder {
            config,
            remote: None,
            connector: Arc::new(WsConnector),
            signer: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Typed event bus of this session.
    pub fn events(&self) -> &Arc<EventBus> {
        &self.inner.bus
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    /// Push channel connection attempts made so far.
    pub fn push_attempts(&self) -> u64 {
        self.inner.push_attempts.load(Ordering::SeqCst)
    }

    pub fn connection_info(&self) -> ConnectionInfo {
        let state = self.state();
        let core = self.inner.core.lock();
        ConnectionInfo {
            state,
            is_connected: state == ConnectionState::Connected,
            endpoint: core.endpoint.clone(),
            mode: core
                .backend
                .as_ref()
                .map_or(ConnectionMode::Fallback, |b| b.mode()),
            stream: core.stream,
            chain: core.node.as_ref().map(|n| n.chain.clone()),
            last_connected: core.last_connected,
        }
    }

    /// Connects to the node, or settles in fallback mode. Never fails.
    ///
    /// A no-op while already connecting or connected.
    pub async fn connect(&self) -> ConnectionInfo {
        if matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            return self.connection_info();
        }

        {
            let mut tasks = self.inner.tasks.lock();
            tasks.closed = false;
            tasks.stop_tracking();
        }
        self.inner.transition(ConnectionState::Connecting);

        let (backend, node) = self.inner.handshake().await;
        {
            let tasks = self.inner.tasks.lock();
            if tasks.closed {
                drop(tasks);
                debug!("Disconnected during handshake, connect abandoned");
                return self.connection_info();
            }
            let mut core = self.inner.core.lock();
            core.backend = Some(Arc::clone(&backend));
            core.node = node;
            if backend.mode() == ConnectionMode::Blockchain {
                core.last_connected = Some(now_millis());
            }
        }

        match backend.mode() {
            ConnectionMode::Blockchain => {
                self.inner.transition(ConnectionState::Connected);
                Inner::start_tracking(&self.inner).await;
            }
            ConnectionMode::Fallback => {
                self.inner.transition(ConnectionState::Error);
                Inner::start_polling(&self.inner);
            }
        }

        let info = self.connection_info();
        info!(
            mode = ?info.mode,
            stream = ?info.stream,
            endpoint = %info.endpoint,
            "Session connected"
        );
        info
    }

    /// Tears down the connection and cancels every background task,
    /// including a pending reconnect.
    pub fn disconnect(&self) {
        let stopped = {
            let mut tasks = self.inner.tasks.lock();
            tasks.closed = true;
            tasks.stop_tracking()
        };
        {
            let mut core = self.inner.core.lock();
            core.backend = None;
            core.node = None;
            core.stream = StreamSource::None;
            core.subscription = None;
        }
        self.inner.transition(ConnectionState::Disconnected);
        if stopped {
            self.inner.publish(SessionEvent::RealTimeStopped);
        }
        info!("Session disconnected");
    }

    /// Restarts live updates: the push channel when talking to a node, the
    /// polling ticker otherwise.
    pub async fn start_tracking(&self) {
        if self.state() == ConnectionState::Disconnected {
            return;
        }
        let blockchain = self.connection_info().mode == ConnectionMode::Blockchain;
        if blockchain {
            Inner::start_tracking(&self.inner).await;
        } else {
            Inner::start_polling(&self.inner);
        }
    }

    /// Stops the push channel, pending reconnect and polling ticker without
    /// touching the connection state.
    pub fn stop_tracking(&self) {
        let stopped = self.inner.tasks.lock().stop_tracking();
        self.inner.core.lock().stream = StreamSource::None;
        if stopped {
            self.inner.publish(SessionEvent::RealTimeStopped);
        }
    }

    /// Clears the savings counter and history and stops live updates.
    pub fn reset(&self) {
        self.stop_tracking();
        self.inner.core.lock().savings = 0;
        self.inner.history.lock().clear();
        self.inner
            .publish(SessionEvent::TransactionHistoryUpdated { length: 0 });
        info!("Session state reset");
    }

    /// Changes the push endpoint; reconnects if the session was connected.
    pub async fn set_endpoint(&self, endpoint: impl Into<String>) {
        self.inner.core.lock().endpoint = endpoint.into();
        if self.state() != ConnectionState::Disconnected {
            self.disconnect();
            self.connect().await;
        }
    }

    /// Binds a wallet: the external signer when it exposes an account, the
    /// demo identity otherwise.
    pub async fn connect_wallet(&self, app_name: &str) -> WalletConnection {
        let (wallet, signer) = bind_wallet(self.inner.external_signer.clone(), app_name).await;
        self.inner.core.lock().wallet = Some((wallet.clone(), signer));
        wallet
    }

    pub fn wallet(&self) -> Option<WalletConnection> {
        self.inner.core.lock().wallet.as_ref().map(|(w, _)| w.clone())
    }

    pub fn is_wallet_connected(&self) -> bool {
        self.inner
            .core
            .lock()
            .wallet
            .as_ref()
            .is_some_and(|(w, _)| w.is_connected)
    }

    pub fn disconnect_wallet(&self) {
        self.inner.core.lock().wallet = None;
        info!("Wallet disconnected");
    }

    pub fn gas_savings(&self) -> u64 {
        self.inner.core.lock().savings
    }

    pub fn gas_savings_info(&self) -> GasSavingsInfo {
        let total_saved = self.gas_savings();
        let completed = self.inner.history.lock().completed();
        let average_per_transaction = if completed.count == 0 {
            0
        } else {
            completed.total / completed.count as u64
        };
        GasSavingsInfo {
            total_saved,
            transaction_count: completed.count,
            average_per_transaction,
            last_updated: now_millis(),
        }
    }

    pub fn savings_with_updates(&self) -> SavingsWithUpdates {
        let now = now_millis();
        let current = self.gas_savings();
        let history = self.inner.history.lock();
        let daily = history.daily(now);
        SavingsWithUpdates {
            current,
            trend: history.trend(),
            last_update: now,
            daily_average: daily.average(),
            daily_total: daily.total,
            weekly_total: history.weekly(now).total,
        }
    }

    /// Newest first, at most `limit` entries.
    pub fn history(&self, limit: usize) -> Vec<HistoryEntry> {
        self.inner
            .history
            .lock()
            .recent(limit)
            .into_iter()
            .map(HistoryEntry::from)
            .collect()
    }

    pub fn history_len(&self) -> usize {
        self.inner.history.lock().len()
    }

    /// Savings the active backend attributes to the bound wallet.
    pub async fn user_gas_savings(&self) -> ClientResult<u64> {
        let account = self
            .wallet()
            .map(|w| w.account.address)
            .ok_or_else(|| {
                ClientError::new(
                    ErrorCode::WalletNotConnected,
                    "Wallet not connected. Call connect_wallet() first.",
                )
            })?;
        self.active_backend().user_gas_savings(&account).await
    }

    // -------------------------------------------------------------------------
    // Issuer support
    // -------------------------------------------------------------------------

    /// Connects and binds a wallet if either is missing.
    pub(crate) async fn ensure_ready(&self) -> (WalletConnection, Arc<dyn Signer>) {
        if self.state() == ConnectionState::Disconnected {
            self.connect().await;
        }
        let bound = self.inner.core.lock().wallet.clone();
        match bound {
            Some(bound) => bound,
            None => {
                self.connect_wallet(DEFAULT_APP_NAME).await;
                let bound = self.inner.core.lock().wallet.clone();
                match bound {
                    Some(bound) => bound,
                    None => bind_wallet(None, DEFAULT_APP_NAME).await,
                }
            }
        }
    }

    /// Backend chosen by the last `connect()`; the simulator before that.
    pub(crate) fn active_backend(&self) -> Arc<dyn SponsorBackend> {
        self.inner
            .core
            .lock()
            .backend
            .clone()
            .unwrap_or_else(|| Arc::clone(&self.inner.simulator))
    }

    /// Applies a successful sponsorship to the counter and history and
    /// publishes the resulting events.
    pub(crate) fn record_success(
        &self,
        pool_id: &PoolId,
        target_chain: ChainId,
        outcome: &SponsorOutcome,
    ) -> TransactionRecord {
        let timestamp = now_millis();
        let seq = self.inner.next_record.fetch_add(1, Ordering::Relaxed);
        let record = TransactionRecord {
            id: format!("tx_{timestamp}_{seq}"),
            target_chain,
            pool_id: pool_id.clone(),
            gas_saved: outcome.gas_saved,
            tx_hash: outcome.tx_hash.clone(),
            timestamp,
            status: RecordStatus::Completed,
        };

        let new_total = {
            let mut core = self.inner.core.lock();
            core.savings = core.savings.saturating_add(outcome.gas_saved);
            core.savings
        };
        let length = {
            let mut history = self.inner.history.lock();
            history.push(record.clone());
            history.len()
        };

        self.inner.publish(SessionEvent::GasSavingsUpdated {
            new_total,
            increment: outcome.gas_saved,
            source: SavingsSource::Transaction,
        });
        self.inner
            .publish(SessionEvent::TransactionCompleted(record.clone()));
        self.inner
            .publish(SessionEvent::TransactionHistoryUpdated { length });
        record
    }
}

impl Inner {
    fn publish(&self, event: SessionEvent) {
        self.bus.publish(event);
    }

    /// Moves along a lifecycle edge; other moves are ignored.
    fn transition(&self, next: ConnectionState) -> bool {
        let mut from = next;
        let changed = self.state_tx.send_if_modified(|state| {
            if *state != next && state.can_transition_to(next) {
                from = *state;
                *state = next;
                true
            } else {
                false
            }
        });
        if changed {
            debug!(?from, to = ?next, "Connection state changed");
            self.publish(SessionEvent::ConnectionStateChanged { from, to: next });
        }
        changed
    }

    /// Node backend when its handshake succeeds, simulator otherwise.
    async fn handshake(&self) -> (Arc<dyn SponsorBackend>, Option<NodeInfo>) {
        let Some(remote) = self.remote.clone() else {
            info!("No node configured, using simulated backend");
            return (Arc::clone(&self.simulator), None);
        };

        let attempt = || {
            let remote = Arc::clone(&remote);
            async move { remote.handshake().await }
        };
        match retry_with_backoff(
            self.config.handshake_attempts,
            self.config.handshake_backoff,
            attempt,
        )
        .await
        {
            Ok(node) => {
                info!(chain = %node.chain, peers = node.peers, "Node handshake complete");
                (remote, Some(node))
            }
            Err(e) => {
                warn!(error = %e, "Failed to reach node, using simulated backend");
                (Arc::clone(&self.simulator), None)
            }
        }
    }

    /// Opens the push channel and subscribes to new heads.
    async fn open_push(&self) -> ClientResult<Box<dyn PushChannel>> {
        self.push_attempts.fetch_add(1, Ordering::SeqCst);
        let endpoint = self.core.lock().endpoint.clone();
        let mut channel = self.connector.connect(&endpoint).await?;

        let id = self.next_request.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, methods::CHAIN_SUBSCRIBE_NEW_HEADS, json!([]));
        channel.send(serde_json::to_string(&request)?).await?;
        Ok(channel)
    }

    /// Push channel if it opens, polling ticker otherwise.
    async fn start_tracking(this: &Arc<Self>) {
        if this.tasks.lock().closed {
            return;
        }
        match this.open_push().await {
            Ok(channel) => {
                Self::attach_stream(this, channel);
            }
            Err(e) => {
                warn!(error = %e, "Push channel unavailable, using polling updates");
                Self::start_polling(this);
            }
        }
    }

    /// Spawns the reader for an open channel. Returns `false` after
    /// `disconnect()`.
    fn attach_stream(this: &Arc<Self>, channel: Box<dyn PushChannel>) -> bool {
        {
            let mut tasks = this.tasks.lock();
            if tasks.closed {
                return false;
            }
            // Called from inside the reconnect task: it is done once the
            // reader exists, so free the slot for the next drop.
            tasks.reconnect.take();
            let reader = tokio::spawn(Self::run_stream(Arc::clone(this), channel));
            if let Some(previous) = tasks.stream.replace(reader) {
                previous.abort();
            }
        }
        this.core.lock().stream = StreamSource::Push;
        this.publish(SessionEvent::StreamConnected {
            source: StreamSource::Push,
        });
        true
    }

    async fn run_stream(this: Arc<Self>, mut channel: Box<dyn PushChannel>) {
        let reason = loop {
            match channel.recv().await {
                Some(Ok(text)) => this.handle_frame(&text),
                Some(Err(e)) => break e.to_string(),
                None => break "closed by peer".to_string(),
            }
        };
        drop(channel);

        info!(reason = %reason, "Push channel disconnected");
        {
            let mut core = this.core.lock();
            core.stream = StreamSource::None;
            core.subscription = None;
        }
        this.publish(SessionEvent::StreamDisconnected { reason });
        this.transition(ConnectionState::Error);
        Self::schedule_reconnect(&this);
    }

    fn handle_frame(&self, text: &str) {
        let frame = match PushFrame::parse(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Failed to parse push message");
                return;
            }
        };

        match frame {
            PushFrame::NewHead { block, .. } => {
                self.publish(SessionEvent::NewHead {
                    number: block.number,
                });
            }
            PushFrame::Reply { id, result } => {
                if let Some(subscription) = result.as_str() {
                    debug!(%id, subscription, "Subscribed to new heads");
                    self.core.lock().subscription = Some(subscription.to_string());
                }
            }
            PushFrame::Failure { id, error } => {
                warn!(%id, code = error.code, message = %error.message, "Push request failed");
            }
            PushFrame::Activity(ActivityMessage::GasSavingsUpdated {
                total_savings,
                increment,
            }) => {
                let new_total = {
                    let mut core = self.core.lock();
                    if total_savings > 0 {
                        core.savings = total_savings;
                    }
                    core.savings
                };
                self.publish(SessionEvent::GasSavingsUpdated {
                    new_total,
                    increment,
                    source: SavingsSource::Push,
                });
            }
            PushFrame::Activity(ActivityMessage::TransactionCompleted(record)) => {
                let length = {
                    let mut history = self.history.lock();
                    history.push(record.clone());
                    history.len()
                };
                self.publish(SessionEvent::TransactionCompleted(record));
                self.publish(SessionEvent::TransactionHistoryUpdated { length });
            }
            PushFrame::Unknown => debug!("Unknown push message ignored"),
        }
    }

    /// Schedules one reconnect after `reconnect_delay` unless one is
    /// already pending or the session was disconnected.
    fn schedule_reconnect(this: &Arc<Self>) -> bool {
        let mut tasks = this.tasks.lock();
        if tasks.closed {
            return false;
        }
        if tasks.reconnect.as_ref().is_some_and(|h| !h.is_finished()) {
            debug!("Reconnect already pending");
            return false;
        }

        let delay = this.config.reconnect_delay;
        let inner = Arc::clone(this);
        tasks.reconnect = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(delay).await;
                if Self::try_reconnect(&inner).await {
                    break;
                }
            }
        }));
        info!(delay_ms = delay.as_millis() as u64, "Reconnect scheduled");
        true
    }

    /// One reconnect attempt. Returns `true` when no further attempt is
    /// needed.
    async fn try_reconnect(this: &Arc<Self>) -> bool {
        if this.tasks.lock().closed {
            return true;
        }
        this.transition(ConnectionState::Connecting);
        match this.open_push().await {
            Ok(channel) => {
                this.transition(ConnectionState::Connected);
                Self::attach_stream(this, channel);
                true
            }
            Err(e) => {
                warn!(error = %e, "Reconnect failed");
                this.transition(ConnectionState::Error);
                false
            }
        }
    }

    /// Local ticker synthesizing small savings increments.
    fn start_polling(this: &Arc<Self>) {
        {
            let mut tasks = this.tasks.lock();
            if tasks.closed || tasks.poller.as_ref().is_some_and(|h| !h.is_finished()) {
                return;
            }
            let period = this.config.poll_interval;
            let inner = Arc::clone(this);
            tasks.poller = Some(tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    inner.poll_tick();
                }
            }));
        }
        this.core.lock().stream = StreamSource::Polling;
        this.publish(SessionEvent::StreamConnected {
            source: StreamSource::Polling,
        });
        info!("Polling-based savings tracking started");
    }

    fn poll_tick(&self) {
        let increment = {
            let mut rng = self.rng.lock();
            if rng.gen_bool(self.config.poll_probability) {
                Some(rng.gen_range(1..=10u64))
            } else {
                None
            }
        };
        let Some(increment) = increment else {
            return;
        };

        let new_total = {
            let mut core = self.core.lock();
            core.savings = core.savings.saturating_add(increment);
            core.savings
        };
        self.publish(SessionEvent::GasSavingsUpdated {
            new_total,
            increment,
            source: SavingsSource::Polling,
        });
    }
}
