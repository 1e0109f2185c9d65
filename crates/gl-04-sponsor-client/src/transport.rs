//! Push channel to the node.
//!
//! [`PushConnector`] opens channels, [`PushChannel`] moves text frames, and
//! [`PushFrame`] classifies what arrives: subscription replies, pushed heads,
//! and activity messages outside the JSON-RPC envelope.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use shared_types::{methods, ActivityMessage, Block, RpcErrorObject, SubscriptionNotification};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::error::ClientResult;

/// Opens push channels.
#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> ClientResult<Box<dyn PushChannel>>;
}

/// A bidirectional text channel.
#[async_trait]
pub trait PushChannel: Send {
    async fn send(&mut self, text: String) -> ClientResult<()>;

    /// Next text frame; `None` once the channel is closed.
    async fn recv(&mut self) -> Option<ClientResult<String>>;
}

/// WebSocket connector.
#[derive(Debug, Default, Clone, Copy)]
pub struct WsConnector;

#[async_trait]
impl PushConnector for WsConnector {
    async fn connect(&self, endpoint: &str) -> ClientResult<Box<dyn PushChannel>> {
        let (stream, _) = connect_async(endpoint).await?;
        debug!(endpoint, "WebSocket connected");
        Ok(Box::new(WsChannel { stream }))
    }
}

struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushChannel for WsChannel {
    async fn send(&mut self, text: String) -> ClientResult<()> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<ClientResult<String>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => debug!("Non UTF-8 binary frame ignored"),
                },
                Ok(Message::Ping(data)) => {
                    if let Err(e) = self.stream.send(Message::Pong(data)).await {
                        return Some(Err(e.into()));
                    }
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// A classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum PushFrame {
    /// Successful reply to a request sent on the channel.
    Reply { id: Value, result: Value },
    /// Failed reply to a request sent on the channel.
    Failure { id: Value, error: RpcErrorObject },
    /// `chain_newHead` notification.
    NewHead { subscription: String, block: Block },
    /// Savings or completed-transaction activity.
    Activity(ActivityMessage),
    /// Anything else.
    Unknown,
}

impl PushFrame {
    /// Classifies a text frame. Fails only on malformed JSON or a malformed
    /// head.
    pub fn parse(text: &str) -> ClientResult<Self> {
        let value: Value = serde_json::from_str(text)?;

        if value.get("type").is_some() {
            return Ok(serde_json::from_value(value)
                .map(PushFrame::Activity)
                .unwrap_or(PushFrame::Unknown));
        }

        if value.get("method").and_then(Value::as_str) == Some(methods::CHAIN_NEW_HEAD) {
            let notification: SubscriptionNotification = serde_json::from_value(value)?;
            let block: Block = serde_json::from_value(notification.params.result)?;
            return Ok(PushFrame::NewHead {
                subscription: notification.params.subscription,
                block,
            });
        }

        let id = value.get("id").cloned().unwrap_or(Value::Null);
        if let Some(error) = value.get("error") {
            let error: RpcErrorObject = serde_json::from_value(error.clone())?;
            return Ok(PushFrame::Failure { id, error });
        }
        if let Some(result) = value.get("result") {
            return Ok(PushFrame::Reply {
                id,
                result: result.clone(),
            });
        }

        Ok(PushFrame::Unknown)
    }
}
