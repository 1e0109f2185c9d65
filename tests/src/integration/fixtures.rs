//! Shared fixtures: a gateway on ephemeral ports plus thin HTTP and
//! WebSocket JSON-RPC clients.

use futures::{SinkExt, StreamExt};
use gl_03_rpc_gateway::{GatewayConfig, GatewayService, RunningGateway};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Upper bound on waiting for any single frame.
pub const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// A running node and an HTTP client pointed at it.
pub struct TestNode {
    pub gateway: RunningGateway,
    pub http_url: String,
    pub ws_url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl TestNode {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(customize: impl FnOnce(&mut GatewayConfig)) -> Self {
        let mut config = GatewayConfig::ephemeral();
        customize(&mut config);

        let gateway = GatewayService::new(config)
            .expect("valid config")
            .start()
            .await
            .expect("gateway starts");
        let http_url = format!("http://{}", gateway.http_addr().expect("http enabled"));
        let ws_url = format!("ws://{}", gateway.ws_addr().expect("ws enabled"));

        Self {
            gateway,
            http_url,
            ws_url,
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Full JSON-RPC response to `method`.
    pub async fn call(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.post(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await
    }

    /// `result` of a call that must succeed.
    pub async fn result(&self, method: &str, params: Value) -> Value {
        let response = self.call(method, params).await;
        assert!(
            response.get("error").is_none(),
            "{method} failed: {response}"
        );
        response["result"].clone()
    }

    /// Posts an arbitrary body and decodes the reply.
    pub async fn post(&self, body: Value) -> Value {
        self.client
            .post(&self.http_url)
            .json(&body)
            .send()
            .await
            .expect("request sent")
            .json()
            .await
            .expect("JSON reply")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.http_url))
            .send()
            .await
            .expect("request sent")
    }

    pub async fn stop(self) {
        self.gateway.shutdown().await;
    }
}

/// Raw WebSocket JSON-RPC client.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
}

impl WsClient {
    pub async fn connect(url: &str) -> Self {
        let (stream, _) = connect_async(url).await.expect("websocket connects");
        Self { stream, next_id: 1 }
    }

    /// Sends a request and returns its id.
    pub async fn send(&mut self, method: &str, params: Value) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        let text = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await
            .expect("frame sent");
        id
    }

    /// Next text frame as JSON.
    pub async fn next_json(&mut self) -> Value {
        loop {
            let frame = tokio::time::timeout(FRAME_TIMEOUT, self.stream.next())
                .await
                .expect("frame before timeout")
                .expect("stream open")
                .expect("valid frame");
            if let Message::Text(text) = frame {
                return serde_json::from_str(text.as_str()).expect("JSON frame");
            }
        }
    }

    /// Waits for the reply to `id`, skipping notifications.
    pub async fn reply(&mut self, id: u64) -> Value {
        loop {
            let frame = self.next_json().await;
            if frame["id"] == json!(id) {
                return frame;
            }
        }
    }

    /// Subscribes to new heads and returns the subscription id.
    pub async fn subscribe_heads(&mut self) -> String {
        let id = self.send("chain_subscribeNewHeads", json!([])).await;
        let reply = self.reply(id).await;
        reply["result"]
            .as_str()
            .expect("subscription id")
            .to_string()
    }

    /// Next `chain_newHead` notification as `(subscription, number)`.
    pub async fn next_head(&mut self) -> (String, u64) {
        loop {
            let frame = self.next_json().await;
            if frame["method"] == "chain_newHead" {
                let subscription = frame["params"]["subscription"]
                    .as_str()
                    .expect("subscription")
                    .to_string();
                let number = shared_types::codec::parse_hex_u64(
                    frame["params"]["result"]["number"].as_str().expect("number"),
                )
                .expect("hex number");
                return (subscription, number);
            }
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
