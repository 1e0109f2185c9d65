//! # Event Publisher
//!
//! The emitting side of the bus plus the callback registry.

use crate::events::{EventFilter, EventKind, SessionEvent};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Trait for publishing events.
pub trait EventPublisher: Send + Sync {
    /// Publish an event to every callback and subscription.
    ///
    /// Returns the number of callbacks that completed without panicking.
    fn publish(&self, event: SessionEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

/// Handle returned by [`EventBus::on`], used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// In-process event bus.
///
/// Callbacks are keyed by [`EventKind`]; async subscribers get clones over a
/// `tokio::sync::broadcast` channel.
pub struct EventBus {
    listeners: RwLock<HashMap<EventKind, Vec<(ListenerId, Listener)>>>,
    next_listener: AtomicU64,
    sender: broadcast::Sender<SessionEvent>,
    events_published: AtomicU64,
    capacity: usize,
}

impl EventBus {
    /// Create a new bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new bus whose async subscribers buffer `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            listeners: RwLock::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            sender,
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register a callback for one event kind.
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push((id, Arc::new(listener)));
        debug!(kind = kind.name(), listener = id.0, "Listener registered");
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(&kind);
        }
        removed
    }

    /// Invoke every callback registered for the event's kind.
    ///
    /// The listener list is snapshotted first, so callbacks may register or
    /// remove listeners without deadlocking. Returns the number of callbacks
    /// that completed normally.
    pub fn emit(&self, event: &SessionEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<Listener> = self
            .listeners
            .read()
            .get(&kind)
            .map(|list| list.iter().map(|(_, l)| Arc::clone(l)).collect())
            .unwrap_or_default();

        let mut completed = 0;
        for listener in snapshot {
            match catch_unwind(AssertUnwindSafe(|| listener(event))) {
                Ok(()) => completed += 1,
                Err(_) => warn!(kind = kind.name(), "Event listener panicked; continuing"),
            }
        }
        completed
    }

    /// Number of callbacks registered for a kind.
    #[must_use]
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }

    /// Remove every callback.
    pub fn clear(&self) {
        self.listeners.write().clear();
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription::new(self.sender.subscribe(), filter)
    }

    /// Get a stream of events matching a filter.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.sender.subscribe(), filter)
    }

    /// Get the number of async subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, event: SessionEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let completed = self.emit(&event);
        // No async subscribers is not an error.
        let receivers = self.sender.send(event).unwrap_or(0);
        debug!(callbacks = completed, receivers, "Event published");
        completed
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
