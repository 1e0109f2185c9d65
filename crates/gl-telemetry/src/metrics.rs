//! Prometheus metrics for the GasLeap node.
//!
//! All metrics follow the naming convention: `gl_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // RPC
    // =========================================================================

    /// RPC requests by method and outcome
    pub static ref RPC_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("gl_rpc_requests_total", "JSON-RPC requests handled"),
        &["method", "outcome"]  // outcome: ok/error
    ).expect("metric creation failed");

    // =========================================================================
    // CHAIN
    // =========================================================================

    /// Blocks produced by the simulator
    pub static ref BLOCKS_PRODUCED: Counter = Counter::new(
        "gl_chain_blocks_produced_total",
        "Total number of simulated blocks produced"
    ).expect("metric creation failed");

    /// Current head block number
    pub static ref CHAIN_HEAD: Gauge = Gauge::new(
        "gl_chain_head_number",
        "Current simulated head block number"
    ).expect("metric creation failed");

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Open push subscriptions
    pub static ref ACTIVE_SUBSCRIPTIONS: Gauge = Gauge::new(
        "gl_ws_subscriptions_active",
        "Number of active push subscriptions"
    ).expect("metric creation failed");

    /// Notifications handed to live transports
    pub static ref NOTIFICATIONS_DELIVERED: Counter = Counter::new(
        "gl_ws_notifications_delivered_total",
        "Total push notifications delivered"
    ).expect("metric creation failed");

    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Sponsored transactions recorded
    pub static ref SPONSORED_TRANSACTIONS: Counter = Counter::new(
        "gl_ledger_sponsored_transactions_total",
        "Total sponsored transactions recorded"
    ).expect("metric creation failed");

    /// Pools created
    pub static ref POOLS_CREATED: Counter = Counter::new(
        "gl_ledger_pools_created_total",
        "Total sponsorship pools created"
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already registered collectors are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(RPC_REQUESTS.clone()),
        Box::new(BLOCKS_PRODUCED.clone()),
        Box::new(CHAIN_HEAD.clone()),
        Box::new(ACTIVE_SUBSCRIPTIONS.clone()),
        Box::new(NOTIFICATIONS_DELIVERED.clone()),
        Box::new(SPONSORED_TRANSACTIONS.clone()),
        Box::new(POOLS_CREATED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Count one RPC request.
pub fn record_rpc(method: &str, ok: bool) {
    RPC_REQUESTS
        .with_label_values(&[method, if ok { "ok" } else { "error" }])
        .inc();
}
