//! # Sponsorship Ledger
//!
//! Memory-resident table of sponsorship pools and the append-only log of
//! sponsored transactions. Wiped on restart.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `balance + totalSpent == totalDeposited` | `domain/store.rs` - `sponsor()` / `fund_pool()` use checked `U256` math |
//! | Balance never wraps or goes negative | `domain/store.rs` - `charge()` |
//! | Pool ids are unique | `domain/store.rs` - sequence-allocated ids |
//! | Transaction log is append-only | `domain/store.rs` - no mutation API |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      MIDDLE LAYER                               │
//! │  ports/outbound.rs - GasOracle, TimeSource traits               │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      INNER LAYER                                │
//! │  domain/policy.rs  - SponsorshipPolicy (gas range, decisions)   │
//! │  domain/store.rs   - LedgerStore                                │
//! │  domain/errors.rs  - LedgerError enum                           │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation happens inside one `&mut self` call, so callers that keep
//! the store behind a lock get read-modify-write atomicity for free.

pub mod domain;
pub mod ports;

pub use domain::*;
pub use ports::*;
