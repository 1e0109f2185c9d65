//! # Shared Types Crate
//!
//! Domain entities, JSON-RPC envelopes and client-side session types used by
//! both the simulated parachain node and the sponsorship client.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses the RPC boundary is
//!   defined here, so node and client agree on the wire shape.
//! - **Big integers stay big**: balances are `U256` and travel as decimal
//!   strings, never as lossy JSON numbers.

pub mod codec;
pub mod entities;
pub mod rpc;
pub mod session;

pub use entities::*;
pub use rpc::*;
pub use session::*;
