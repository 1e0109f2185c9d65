//! # Session Events
//!
//! The closed set of events a session publishes, each with a fixed payload.

use serde::{Deserialize, Serialize};
use shared_types::{BlockNumber, ConnectionState, StreamSource, TransactionRecord};

/// Where a savings increment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SavingsSource {
    /// A transaction submitted through this session.
    Transaction,
    /// A push message from the node.
    Push,
    /// The local polling ticker (synthetic).
    Polling,
}

/// All events that can be emitted on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Cumulative savings changed.
    GasSavingsUpdated {
        new_total: u64,
        increment: u64,
        source: SavingsSource,
    },

    /// A sponsored transaction finished and was recorded.
    TransactionCompleted(TransactionRecord),

    /// History contents changed (insert or reset).
    TransactionHistoryUpdated { length: usize },

    /// The session moved between connection states.
    ConnectionStateChanged {
        from: ConnectionState,
        to: ConnectionState,
    },

    /// A live update source started.
    StreamConnected { source: StreamSource },

    /// The live update source went away.
    StreamDisconnected { reason: String },

    /// The node pushed a new head.
    NewHead { number: BlockNumber },

    /// Real-time tracking was stopped (reset or disconnect).
    RealTimeStopped,
}

/// Discriminant of [`SessionEvent`], used to register listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    GasSavingsUpdated,
    TransactionCompleted,
    TransactionHistoryUpdated,
    ConnectionStateChanged,
    StreamConnected,
    StreamDisconnected,
    NewHead,
    RealTimeStopped,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::GasSavingsUpdated,
        EventKind::TransactionCompleted,
        EventKind::TransactionHistoryUpdated,
        EventKind::ConnectionStateChanged,
        EventKind::StreamConnected,
        EventKind::StreamDisconnected,
        EventKind::NewHead,
        EventKind::RealTimeStopped,
    ];

    /// Wire name, as used by UI consumers.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::GasSavingsUpdated => "gas_savings_updated",
            EventKind::TransactionCompleted => "transaction_completed",
            EventKind::TransactionHistoryUpdated => "transaction_history_updated",
            EventKind::ConnectionStateChanged => "connection_state_changed",
            EventKind::StreamConnected => "websocket_connected",
            EventKind::StreamDisconnected => "websocket_disconnected",
            EventKind::NewHead => "new_head",
            EventKind::RealTimeStopped => "realtime_stopped",
        }
    }
}

impl SessionEvent {
    /// Get the kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            SessionEvent::GasSavingsUpdated { .. } => EventKind::GasSavingsUpdated,
            SessionEvent::TransactionCompleted(_) => EventKind::TransactionCompleted,
            SessionEvent::TransactionHistoryUpdated { .. } => EventKind::TransactionHistoryUpdated,
            SessionEvent::ConnectionStateChanged { .. } => EventKind::ConnectionStateChanged,
            SessionEvent::StreamConnected { .. } => EventKind::StreamConnected,
            SessionEvent::StreamDisconnected { .. } => EventKind::StreamDisconnected,
            SessionEvent::NewHead { .. } => EventKind::NewHead,
            SessionEvent::RealTimeStopped => EventKind::RealTimeStopped,
        }
    }
}

/// Filter for async subscriptions.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to receive. Empty means all.
    pub kinds: Vec<EventKind>,
}

impl EventFilter {
    /// Create a filter that matches all events.
    #[must_use]
    pub fn all() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Create a filter for specific kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self { kinds }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &SessionEvent) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind())
    }
}
