//! WebSocket connection handler.
//!
//! Each connection gets one bounded outbound queue. Replies and pushed
//! notifications both go through it, drained by a writer task. When the
//! socket closes the connection's subscriptions are removed before the
//! queue is dropped.
//!
//! A subscribe reply is queued before the subscription goes live, so the
//! client always learns its id before the first `chain_newHead`.

use crate::domain::ConnectionId;
use crate::router::{PushContext, RpcRouter};
use crate::ws::SubscriptionRegistry;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Serves one WebSocket connection until it closes.
pub async fn handle_socket(
    socket: WebSocket,
    router: Arc<RpcRouter>,
    registry: Arc<SubscriptionRegistry>,
    buffer: usize,
) {
    let connection_id = ConnectionId::new();
    info!(connection_id = %connection_id, "New WebSocket connection");

    let (mut sink, mut stream) = socket.split();
    let (outbound, mut queue) = mpsc::channel::<String>(buffer.max(1));

    let writer = tokio::spawn(async move {
        while let Some(text) = queue.recv().await {
            if sink.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    let push = PushContext {
        connection_id,
        outbound: outbound.clone(),
        registry: Arc::clone(&registry),
    };

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => {
                    warn!(connection_id = %connection_id, "Non UTF-8 binary frame ignored");
                    continue;
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Err(e) => {
                debug!(connection_id = %connection_id, error = %e, "WebSocket read error");
                break;
            }
        };

        if !answer(&router, &push, &text).await {
            break;
        }
    }

    let removed = registry.remove_connection(&connection_id);
    drop(push);
    drop(outbound);
    writer.abort();

    info!(
        connection_id = %connection_id,
        subscriptions_removed = removed,
        "WebSocket connection closed"
    );
}

/// Answers one frame and then activates the subscriptions it created.
/// Returns `false` once the outbound queue is closed.
pub(crate) async fn answer(router: &RpcRouter, push: &PushContext, text: &str) -> bool {
    let reply = router.handle_text(text, Some(push));
    let queued = match serde_json::to_string(&reply) {
        Ok(reply) => push.outbound.send(reply).await.is_ok(),
        Err(e) => {
            warn!(connection_id = %push.connection_id, error = %e, "Failed to encode reply");
            true
        }
    };
    if queued {
        push.registry.activate_pending(&push.connection_id);
    }
    queued
}
