//! # GasLeap Test Suite
//!
//! Cross-crate scenarios run against a real gateway bound to ephemeral
//! loopback ports.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs        # node startup, JSON-RPC and WebSocket helpers
//!     ├── node_rpc.rs        # pools, sponsorship, error codes over HTTP
//!     ├── subscriptions.rs   # chain_newHead delivery over WebSocket
//!     └── client_session.rs  # Session + TransactionIssuer against the node
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gl-tests
//! cargo test -p gl-tests integration::subscriptions::
//! ```

pub mod integration;
