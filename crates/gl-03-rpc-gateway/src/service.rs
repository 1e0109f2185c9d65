//! Gateway service - binds the servers and starts the block producer.
//!
//! ```text
//!   HTTP  :9933  POST /         ──▶ RpcRouter ──▶ handlers ──▶ NodeHandle
//!                GET  /health
//!                GET  /metrics
//!   WS    :9944  GET  / (upgrade) ─▶ RpcRouter + SubscriptionRegistry
//!   BlockProducer ── every block_time ──▶ NodeHandle::advance ─▶ publish_head
//! ```

use crate::domain::config::{CorsConfig, GatewayConfig};
use crate::domain::error::{ApiError, GatewayError};
use crate::node::NodeHandle;
use crate::router::RpcRouter;
use crate::rpc::RpcHandlers;
use crate::ws::{handle_socket, SubscriptionRegistry};
use axum::{
    extract::{ws::WebSocketUpgrade, DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use gl_01_ledger::LedgerStore;
use gl_02_chain_sim::{BlockProducer, ChainState, ProducerHandle};
use gl_telemetry::encode_metrics;
use serde_json::Value;
use shared_types::{HealthReport, RpcResponse};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// How long shutdown waits for a server task before aborting it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A configured, not yet running gateway.
pub struct GatewayService {
    config: GatewayConfig,
    node: NodeHandle,
    router: Arc<RpcRouter>,
}

impl GatewayService {
    /// Creates the node state with a random gas oracle.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let ledger = LedgerStore::new(config.sponsorship.clone());
        Self::with_ledger(config, ledger)
    }

    /// Creates the node state around a prepared ledger.
    pub fn with_ledger(config: GatewayConfig, mut ledger: LedgerStore) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let chain = ChainState::new(config.chain.base_block);
        if config.chain.seed_demo_pool {
            ledger.seed_demo_pool(chain.number());
        }

        let registry = Arc::new(SubscriptionRegistry::new(
            config.websocket.max_subscriptions_per_connection,
        ));
        let node = NodeHandle::new(ledger, chain, registry);
        let router = Arc::new(RpcRouter::new(RpcHandlers::new(&config.chain, node.clone())));

        Ok(Self {
            config,
            node,
            router,
        })
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Binds the listeners, starts serving and starts the block producer.
    ///
    /// Port 0 binds an ephemeral port; the bound addresses are reported on
    /// the returned handle.
    pub async fn start(self) -> Result<RunningGateway, GatewayError> {
        info!("Starting GasLeap gateway...");
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut servers = Vec::new();

        let http_addr = if self.config.http.enabled {
            let listener = bind(self.config.http_addr()).await?;
            let addr = local_addr(&listener)?;
            let router = self.build_http_router();
            servers.push(serve("HTTP", listener, router, shutdown_rx.clone()));
            info!(addr = %addr, "HTTP server listening");
            Some(addr)
        } else {
            None
        };

        let ws_addr = if self.config.websocket.enabled {
            let listener = bind(self.config.ws_addr()).await?;
            let addr = local_addr(&listener)?;
            let router = self.build_ws_router();
            servers.push(serve("WebSocket", listener, router, shutdown_rx.clone()));
            info!(addr = %addr, "WebSocket server listening");
            Some(addr)
        } else {
            None
        };

        let producer =
            BlockProducer::new(self.config.chain.block_time, Arc::new(self.node.clone())).spawn();

        info!(
            chain = %self.config.chain.chain,
            head = self.node.head().number,
            block_time_ms = self.config.chain.block_time.as_millis() as u64,
            "Gateway started"
        );

        Ok(RunningGateway {
            http_addr,
            ws_addr,
            node: self.node,
            producer: Some(producer),
            servers,
            shutdown_tx,
        })
    }

    fn build_http_router(&self) -> Router {
        let state = AppState {
            router: Arc::clone(&self.router),
            node: self.node.clone(),
            chain: self.config.chain.chain.clone(),
        };

        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.config.cors));

        Router::new()
            .route("/", post(handle_json_rpc))
            .route("/health", get(health_check))
            .route("/metrics", get(metrics))
            .layer(DefaultBodyLimit::max(self.config.limits.max_request_size))
            .layer(middleware)
            .with_state(state)
    }

    fn build_ws_router(&self) -> Router {
        let router = Arc::clone(&self.router);
        let registry = Arc::clone(self.node.subscriptions());
        let buffer = self.config.websocket.message_buffer_size;

        Router::new().route(
            "/",
            get(move |ws: WebSocketUpgrade| async move {
                ws.on_upgrade(move |socket| handle_socket(socket, router, registry, buffer))
            }),
        )
    }
}

/// Handle to a running gateway.
pub struct RunningGateway {
    http_addr: Option<SocketAddr>,
    ws_addr: Option<SocketAddr>,
    node: NodeHandle,
    producer: Option<ProducerHandle>,
    servers: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl RunningGateway {
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_addr
    }

    pub fn ws_addr(&self) -> Option<SocketAddr> {
        self.ws_addr
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Stops block production and both servers.
    pub async fn shutdown(mut self) {
        info!("Shutting down gateway");
        if let Some(producer) = self.producer.take() {
            producer.stop().await;
        }
        let _ = self.shutdown_tx.send(true);

        for server in self.servers.drain(..) {
            let abort = server.abort_handle();
            if tokio::time::timeout(SHUTDOWN_GRACE, server).await.is_err() {
                warn!("Server did not stop in time, aborting");
                abort.abort();
            }
        }
        info!("Gateway stopped");
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
struct AppState {
    router: Arc<RpcRouter>,
    node: NodeHandle,
    chain: String,
}

/// Handle JSON-RPC request
async fn handle_json_rpc(State(state): State<AppState>, body: String) -> impl IntoResponse {
    let request: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            let error = ApiError::parse_error(e.to_string()).into_object();
            let body = serde_json::to_value(RpcResponse::failure(Value::Null, error))
                .unwrap_or(Value::Null);
            return (StatusCode::BAD_REQUEST, Json(body));
        }
    };

    (StatusCode::OK, Json(state.router.handle_value(request, None)))
}

/// Health probe for operational tooling
async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    let report = state.node.read(|s| HealthReport {
        status: "healthy".to_string(),
        chain: state.chain.clone(),
        block_number: s.chain.number(),
        pools: s.ledger.pool_count(),
        transactions: s.ledger.transaction_count(),
    });
    Json(report)
}

/// Prometheus text exposition
async fn metrics() -> impl IntoResponse {
    match encode_metrics() {
        Ok(text) => (StatusCode::OK, text),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::new();
    }

    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let list: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(list)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn bind(addr: SocketAddr) -> Result<TcpListener, GatewayError> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))
}

fn local_addr(listener: &TcpListener) -> Result<SocketAddr, GatewayError> {
    listener
        .local_addr()
        .map_err(|e| GatewayError::Bind(e.to_string()))
}

fn serve(
    name: &'static str,
    listener: TcpListener,
    router: Router,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let signal = async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        };
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await
        {
            error!(server = name, error = %e, "Server error");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let mut config = GatewayConfig::ephemeral();
        config.sponsorship.gas_cost_min = 500;
        assert!(matches!(
            GatewayService::new(config),
            Err(GatewayError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_demo_pool_seeded() {
        let service = GatewayService::new(GatewayConfig::ephemeral()).unwrap();
        let seeded = service
            .node()
            .read(|s| s.ledger.get_pool(&"demo-pool-1".into()).is_some());
        assert!(seeded);
    }

    #[tokio::test]
    async fn test_seeding_can_be_disabled() {
        let mut config = GatewayConfig::ephemeral();
        config.chain.seed_demo_pool = false;
        let service = GatewayService::new(config).unwrap();
        assert_eq!(service.node().read(|s| s.ledger.pool_count()), 0);
    }

    #[tokio::test]
    async fn test_http_roundtrip_and_health() {
        let running = GatewayService::new(GatewayConfig::ephemeral())
            .unwrap()
            .start()
            .await
            .unwrap();
        let base = format!("http://{}", running.http_addr().unwrap());
        let client = reqwest::Client::new();

        let resp: Value = client
            .post(&base)
            .json(&serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "system_chain"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp["result"], "MockChain");

        let bad = client
            .post(&base)
            .header("content-type", "application/json")
            .body("{oops")
            .send()
            .await
            .unwrap();
        assert_eq!(bad.status(), reqwest::StatusCode::BAD_REQUEST);
        let bad: Value = bad.json().await.unwrap();
        assert_eq!(bad["error"]["code"], -32700);

        let health: Value = client
            .get(format!("{base}/health"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["chain"], "MockChain");
        assert_eq!(health["pools"], 1);
        assert_eq!(health["transactions"], 0);
        assert!(health["blockNumber"].as_u64().unwrap() >= 1000);

        running.shutdown().await;
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mut config = GatewayConfig::ephemeral();
        config.limits.max_request_size = 128;
        let running = GatewayService::new(config).unwrap().start().await.unwrap();
        let base = format!("http://{}", running.http_addr().unwrap());
        let client = reqwest::Client::new();

        let padding = "x".repeat(512);
        let resp = client
            .post(&base)
            .json(&serde_json::json!({"id": 1, "method": "system_name", "params": [padding]}))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::PAYLOAD_TOO_LARGE);

        let resp: Value = client
            .post(&base)
            .json(&serde_json::json!({"id": 2, "method": "system_name"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(resp["result"], "GasLeap Mock Parachain");

        running.shutdown().await;
    }
}
