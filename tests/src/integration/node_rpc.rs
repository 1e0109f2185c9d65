//! # Node JSON-RPC over HTTP
//!
//! Pools and sponsorship against a live gateway:
//!
//! ```text
//! createPool(A, 1_000_000) ──▶ sponsorTransaction(pool, 1000, {})
//!                                   │ gasCost ∈ [50, 150]
//!                                   ▼
//!                         balance = 1_000_000 − gasCost
//! ```

use super::fixtures::TestNode;
use gl_01_ledger::MissingPoolPolicy;
use serde_json::json;

#[tokio::test]
async fn test_create_pool_then_sponsor_deducts_gas() {
    let node = TestNode::start().await;

    let created = node
        .result("sponsorship_createPool", json!(["A", "1000000"]))
        .await;
    let pool_id = created["poolId"].as_str().unwrap().to_string();

    let pool = node.result("sponsorship_pools", json!([pool_id])).await;
    assert_eq!(pool["balance"], "1000000");
    assert_eq!(pool["totalSpent"], "0");
    assert_eq!(pool["owner"], "A");

    let head_before = node.gateway.node().head().number;
    let receipt = node
        .result(
            "sponsorship_sponsorTransaction",
            json!([pool_id, 1000, {}]),
        )
        .await;
    let gas = receipt["gasCost"].as_u64().unwrap();
    assert!((50..=150).contains(&gas));
    assert!(node.gateway.node().head().number > head_before);

    let pool = node.result("sponsorship_pools", json!([pool_id])).await;
    assert_eq!(pool["balance"], (1_000_000 - gas).to_string().as_str());
    assert_eq!(pool["totalSpent"], gas.to_string().as_str());

    node.stop().await;
}

#[tokio::test]
async fn test_unknown_method_names_the_method() {
    let node = TestNode::start().await;

    let response = node.post(json!({"method": "foo_bar"})).await;
    assert_eq!(response["error"]["code"], -32601);
    assert_eq!(response["error"]["message"], "Method not found: foo_bar");

    node.stop().await;
}

#[tokio::test]
async fn test_domain_errors_carry_their_codes() {
    let node = TestNode::start_with(|config| {
        config.sponsorship.missing_pool = MissingPoolPolicy::Reject;
    })
    .await;

    let missing = node
        .call("sponsorship_sponsorTransaction", json!(["no-such-pool", 1000, {}]))
        .await;
    assert_eq!(missing["error"]["code"], -32001);

    let created = node
        .result("sponsorship_createPool", json!(["A", "60"]))
        .await;
    let pool_id = created["poolId"].as_str().unwrap().to_string();
    let mut failures = 0;
    for _ in 0..3 {
        let response = node
            .call("sponsorship_sponsorTransaction", json!([pool_id, 1000, {}]))
            .await;
        if response["error"]["code"] == -32003 {
            failures += 1;
        }
    }
    assert!(failures >= 2);

    let pool = node.result("sponsorship_pools", json!([pool_id])).await;
    let balance: u64 = pool["balance"].as_str().unwrap().parse().unwrap();
    let spent: u64 = pool["totalSpent"].as_str().unwrap().parse().unwrap();
    assert_eq!(balance + spent, 60);

    node.stop().await;
}

#[tokio::test]
async fn test_unknown_pool_is_recorded_by_default() {
    let node = TestNode::start().await;
    let head_before = node.gateway.node().head().number;

    let receipt = node
        .result(
            "sponsorship_sponsorTransaction",
            json!(["no-such-pool", 1000, {}]),
        )
        .await;
    assert_eq!(receipt["status"], "executed");
    assert!(node.gateway.node().head().number > head_before);

    let pool = node.result("sponsorship_pools", json!(["no-such-pool"])).await;
    assert!(pool.is_null());
    let history = node
        .result("sponsorship_getTransactionHistory", json!(["no-such-pool"]))
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    node.stop().await;
}

#[tokio::test]
async fn test_demo_pool_and_named_params() {
    let node = TestNode::start().await;

    let pool = node.result("sponsorship_pools", json!(["demo-pool-1"])).await;
    assert_eq!(pool["balance"], "1000000000000000");
    assert_eq!(pool["totalSpent"], "250000000000000");

    let receipt = node
        .result(
            "sponsorship_sponsorTransaction",
            json!({
                "poolId": "demo-pool-1",
                "targetChain": 2000,
                "callData": {"method": "transfer"},
                "user": "B",
                "signature": "0xignored"
            }),
        )
        .await;
    let gas = receipt["gasCost"].as_u64().unwrap();

    let savings = node
        .result("sponsorship_getUserGasSavings", json!(["B"]))
        .await;
    assert_eq!(savings, gas.to_string().as_str());

    let history = node
        .result("sponsorship_getTransactionHistory", json!(["demo-pool-1"]))
        .await;
    assert_eq!(history.as_array().unwrap().len(), 1);

    node.stop().await;
}

#[tokio::test]
async fn test_system_identity_and_probes() {
    let node = TestNode::start().await;

    assert_eq!(
        node.result("system_name", json!([])).await,
        "GasLeap Mock Parachain"
    );
    assert_eq!(node.result("system_chain", json!([])).await, "MockChain");
    assert_eq!(node.result("system_version", json!([])).await, "1.0.0-mock");

    let health: serde_json::Value = node.get("/health").await.json().await.unwrap();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["pools"], 1);

    let metrics = node.get("/metrics").await;
    assert!(metrics.status().is_success());

    node.stop().await;
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let node = TestNode::start().await;

    let response = reqwest::Client::new()
        .post(&node.http_url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], -32700);

    node.stop().await;
}
