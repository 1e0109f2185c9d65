//! # Shared Bus - Typed Event Bus for the Client Session
//!
//! Fans session events (savings updates, completed transactions, connection
//! state changes, new heads) out to interested parties.
//!
//! ## Two ways to listen
//!
//! ```text
//!                  ┌──────────────┐   on(kind, fn)    ┌──────────────┐
//!  Session ──emit──│  Event Bus   │ ────────────────▶ │  callbacks   │
//!                  │              │                   └──────────────┘
//!                  │              │   subscribe()     ┌──────────────┐
//!                  │              │ ────────────────▶ │ async stream │
//!                  └──────────────┘                   └──────────────┘
//! ```
//!
//! - **Callbacks** run synchronously inside `emit`. A panicking callback is
//!   caught and logged; the remaining callbacks still run.
//! - **Subscriptions** receive clones over a broadcast channel and can lag.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{EventFilter, EventKind, SavingsSource, SessionEvent};
pub use publisher::{EventBus, EventPublisher, ListenerId};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per async subscriber before it lags.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;
