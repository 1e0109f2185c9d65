//! # Chain State Simulator
//!
//! A monotonic block counter that advances on a fixed period. Each advance
//! builds a new head [`Block`](shared_types::Block) with deterministic
//! placeholder hashes; only the current head is retained.
//!
//! ```text
//!   BlockProducer ──tick (every block_time)──▶ ChainHead::advance_head()
//!                                                   │
//!                                                   ▼
//!                                        ChainState { head: n + 1 }
//! ```
//!
//! The producer only knows the [`ChainHead`] port. The node implements it so
//! that advancing the head and notifying subscribers happen under one lock.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::*;
pub use ports::*;
pub use service::{BlockProducer, ProducerHandle};

/// Reference head the simulator starts from.
pub const DEFAULT_BASE_BLOCK: u64 = 1000;

/// Reference block period.
pub const DEFAULT_BLOCK_TIME: std::time::Duration = std::time::Duration::from_secs(6);
