//! Ports layer for the ledger.
//!
//! Outbound (driven) ports only: where gas costs and timestamps come from.

pub mod outbound;

pub use outbound::*;
