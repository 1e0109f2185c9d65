//! # chain_newHead Delivery
//!
//! Heads pushed to WebSocket subscribers follow the block counter: gapless,
//! strictly increasing, one notification per subscription per head.

use super::fixtures::{TestNode, WsClient};
use serde_json::json;
use std::time::Duration;

async fn fast_node() -> TestNode {
    TestNode::start_with(|config| {
        config.chain.block_time = Duration::from_millis(300);
    })
    .await
}

#[tokio::test]
async fn test_heads_follow_ticks() {
    let node = fast_node().await;
    let mut ws = WsClient::connect(&node.ws_url).await;

    let subscription = ws.subscribe_heads().await;

    let mut previous = None;
    for _ in 0..4 {
        let (sub, number) = ws.next_head().await;
        assert_eq!(sub, subscription);
        if let Some(previous) = previous {
            assert_eq!(number, previous + 1);
        }
        previous = Some(number);
    }
    assert!(previous.unwrap() <= node.gateway.node().head().number);

    ws.close().await;
    node.stop().await;
}

#[tokio::test]
async fn test_subscription_id_arrives_before_heads() {
    let node = TestNode::start_with(|config| {
        config.chain.block_time = Duration::from_millis(2);
    })
    .await;

    for _ in 0..20 {
        let mut ws = WsClient::connect(&node.ws_url).await;
        let id = ws.send("chain_subscribeNewHeads", json!([])).await;

        let first = ws.next_json().await;
        assert_eq!(first["id"], id, "first frame was {first}");
        let subscription = first["result"].as_str().unwrap().to_string();

        let (sub, _) = ws.next_head().await;
        assert_eq!(sub, subscription);
        ws.close().await;
    }

    node.stop().await;
}

#[tokio::test]
async fn test_heads_from_base_block() {
    let node = TestNode::start_with(|config| {
        config.chain.block_time = Duration::from_millis(500);
    })
    .await;
    let mut ws = WsClient::connect(&node.ws_url).await;
    ws.subscribe_heads().await;

    assert_eq!(ws.next_head().await.1, 1001);
    assert_eq!(ws.next_head().await.1, 1002);

    ws.close().await;
    node.stop().await;
}

#[tokio::test]
async fn test_sponsorship_pushes_a_head() {
    let node = TestNode::start().await;
    let mut ws = WsClient::connect(&node.ws_url).await;
    ws.subscribe_heads().await;

    let receipt = node
        .result(
            "sponsorship_sponsorTransaction",
            json!(["demo-pool-1", 2000, {}]),
        )
        .await;
    assert!(receipt["gasCost"].as_u64().is_some());

    let (_, number) = ws.next_head().await;
    assert_eq!(number, 1001);

    ws.close().await;
    node.stop().await;
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let node = fast_node().await;
    let mut ws = WsClient::connect(&node.ws_url).await;
    let subscription = ws.subscribe_heads().await;
    ws.next_head().await;

    let id = ws
        .send("chain_unsubscribeNewHeads", json!([subscription]))
        .await;
    assert_eq!(ws.reply(id).await["result"], true);

    let id = ws
        .send("chain_unsubscribeNewHeads", json!([subscription]))
        .await;
    assert_eq!(ws.reply(id).await["result"], false);

    // A second subscription on the same connection still receives heads
    // while the first stays silent.
    let fresh = ws.subscribe_heads().await;
    let (sub, _) = ws.next_head().await;
    assert_eq!(sub, fresh);
    let (sub, _) = ws.next_head().await;
    assert_eq!(sub, fresh);

    ws.close().await;
    node.stop().await;
}

#[tokio::test]
async fn test_subscribe_over_http_is_rejected() {
    let node = TestNode::start().await;
    let response = node.call("chain_subscribeNewHeads", json!([])).await;
    assert_eq!(response["error"]["code"], -32600);
    node.stop().await;
}

#[tokio::test]
async fn test_plain_calls_over_websocket() {
    let node = TestNode::start().await;
    let mut ws = WsClient::connect(&node.ws_url).await;

    let id = ws.send("system_chain", json!([])).await;
    assert_eq!(ws.reply(id).await["result"], "MockChain");

    let id = ws.send("foo_bar", json!([])).await;
    let reply = ws.reply(id).await;
    assert_eq!(reply["error"]["code"], -32601);
    assert_eq!(reply["error"]["message"], "Method not found: foo_bar");

    ws.close().await;
    node.stop().await;
}
