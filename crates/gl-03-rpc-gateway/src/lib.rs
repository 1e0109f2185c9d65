//! # GasLeap RPC Gateway
//!
//! The simulated parachain's public interface: a JSON-RPC 2.0 dispatcher
//! served over HTTP and WebSocket, plus `chain_newHead` push subscriptions.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  HTTP :9933              WebSocket :9944                           │
//! │  POST / · /health        subscribe / unsubscribe / any method      │
//! └──────────┬───────────────────────┬─────────────────────────────────┘
//!            ▼                       ▼
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  RpcRouter: method table, catch_unwind per call, -32601 / -32603   │
//! └──────────┬───────────────────────┬─────────────────────────────────┘
//!            ▼                       ▼
//! ┌─────────────────────┐   ┌──────────────────────────────────────────┐
//! │ RpcHandlers         │   │ SubscriptionRegistry                     │
//! │ system/chain/state/ │   │ id → connection outbound queue           │
//! │ sponsorship         │   │ dead transports dropped on publish       │
//! └──────────┬──────────┘   └───────────────▲──────────────────────────┘
//!            ▼                              │ publish_head (under lock)
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  NodeHandle: Mutex<{ LedgerStore, ChainState }>                    │
//! └───────────────────────────────▲────────────────────────────────────┘
//!                                 │ advance_head every block_time
//!                          BlockProducer
//! ```
//!
//! ## Error Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | -32700 | Parse error |
//! | -32600 | Invalid request |
//! | -32601 | Method not found (message names the method) |
//! | -32602 | Invalid params |
//! | -32603 | Internal error (including handler panics) |
//! | -32001 | Pool not found |
//! | -32002 | Limit exceeded |
//! | -32003 | Insufficient balance |
//! | -32004 | Chain not supported |

pub mod domain;
pub mod node;
pub mod router;
pub mod rpc;
pub mod service;
pub mod ws;

pub use domain::config::GatewayConfig;
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use node::{NodeHandle, NodeState};
pub use router::{PushContext, RpcRouter};
pub use service::{GatewayService, RunningGateway};
pub use ws::{SubscribeError, SubscriptionRegistry};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
