//! Subscription registry.
//!
//! Maps subscription ids to the outbound queue of the connection that owns
//! them. The connection owns the queue; the registry only holds a sender.
//! A closed queue means the transport is gone, and the subscription is
//! dropped on the next publish.
//!
//! Subscriptions created from a request start pending and receive nothing
//! until [`SubscriptionRegistry::activate_pending`] runs, which the
//! connection does after queueing the reply that carries the id.

use crate::domain::{ConnectionId, SubscriptionTopic};
use dashmap::DashMap;
use gl_telemetry::{ACTIVE_SUBSCRIPTIONS, NOTIFICATIONS_DELIVERED};
use shared_types::{Block, SubscriptionNotification};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Subscription ID (hex string)
pub type SubscriptionId = String;

/// Outbound text frames of one connection.
pub type Outbound = mpsc::Sender<String>;

#[derive(Debug, Clone)]
struct Subscription {
    topic: SubscriptionTopic,
    connection_id: ConnectionId,
    sink: Outbound,
    active: bool,
}

/// Subscribe errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscribeError {
    #[error("too many subscriptions for this connection (max {0})")]
    TooManySubscriptions(usize),
}

/// All live subscriptions of the node.
pub struct SubscriptionRegistry {
    subscriptions: DashMap<SubscriptionId, Subscription>,
    by_connection: DashMap<ConnectionId, Vec<SubscriptionId>>,
    id_counter: AtomicU64,
    max_per_connection: usize,
}

impl SubscriptionRegistry {
    pub fn new(max_per_connection: usize) -> Self {
        Self {
            subscriptions: DashMap::new(),
            by_connection: DashMap::new(),
            id_counter: AtomicU64::new(1),
            max_per_connection,
        }
    }

    /// Registers a live subscription and returns its process-unique id.
    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
        topic: SubscriptionTopic,
        sink: Outbound,
    ) -> Result<SubscriptionId, SubscribeError> {
        self.register(connection_id, topic, sink, true)
    }

    /// Registers a subscription that stays silent until
    /// [`activate_pending`](Self::activate_pending).
    pub fn subscribe_pending(
        &self,
        connection_id: ConnectionId,
        topic: SubscriptionTopic,
        sink: Outbound,
    ) -> Result<SubscriptionId, SubscribeError> {
        self.register(connection_id, topic, sink, false)
    }

    /// Makes every pending subscription of a connection live. Returns how
    /// many were activated.
    pub fn activate_pending(&self, connection_id: &ConnectionId) -> usize {
        let Some(sub_ids) = self.by_connection.get(connection_id).map(|subs| subs.clone()) else {
            return 0;
        };
        let mut activated = 0;
        for sub_id in sub_ids {
            if let Some(mut sub) = self.subscriptions.get_mut(&sub_id) {
                if !sub.active {
                    sub.active = true;
                    activated += 1;
                }
            }
        }
        activated
    }

    fn register(
        &self,
        connection_id: ConnectionId,
        topic: SubscriptionTopic,
        sink: Outbound,
        active: bool,
    ) -> Result<SubscriptionId, SubscribeError> {
        let mut conn_subs = self.by_connection.entry(connection_id).or_default();
        if conn_subs.len() >= self.max_per_connection {
            return Err(SubscribeError::TooManySubscriptions(
                self.max_per_connection,
            ));
        }

        let id_num = self.id_counter.fetch_add(1, Ordering::SeqCst);
        let sub_id = format!("0x{:x}", id_num);

        self.subscriptions.insert(
            sub_id.clone(),
            Subscription {
                topic,
                connection_id,
                sink,
                active,
            },
        );
        conn_subs.push(sub_id.clone());
        drop(conn_subs);
        self.update_gauge();

        debug!(
            subscription_id = %sub_id,
            connection_id = %connection_id,
            topic = ?topic,
            active,
            "Created subscription"
        );
        Ok(sub_id)
    }

    /// Removes one subscription. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, subscription_id: &str) -> bool {
        let Some((_, sub)) = self.subscriptions.remove(subscription_id) else {
            return false;
        };

        if let Some(mut conn_subs) = self.by_connection.get_mut(&sub.connection_id) {
            conn_subs.retain(|id| id != subscription_id);
        }
        self.by_connection
            .remove_if(&sub.connection_id, |_, subs| subs.is_empty());
        self.update_gauge();

        debug!(subscription_id = %subscription_id, "Removed subscription");
        true
    }

    /// Same as [`unsubscribe`](Self::unsubscribe), restricted to the
    /// caller's own subscriptions.
    pub fn unsubscribe_owned(&self, connection_id: &ConnectionId, subscription_id: &str) -> bool {
        let owned = self
            .subscriptions
            .get(subscription_id)
            .is_some_and(|sub| &sub.connection_id == connection_id);
        owned && self.unsubscribe(subscription_id)
    }

    /// Drops every subscription of a closed connection.
    pub fn remove_connection(&self, connection_id: &ConnectionId) -> usize {
        let Some((_, sub_ids)) = self.by_connection.remove(connection_id) else {
            return 0;
        };
        let removed = sub_ids
            .iter()
            .filter(|id| self.subscriptions.remove(id.as_str()).is_some())
            .count();
        self.update_gauge();

        debug!(
            connection_id = %connection_id,
            removed,
            "Removed all subscriptions for connection"
        );
        removed
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn connection_subscriptions(&self, connection_id: &ConnectionId) -> Vec<SubscriptionId> {
        self.by_connection
            .get(connection_id)
            .map(|subs| subs.clone())
            .unwrap_or_default()
    }

    /// Pushes a new head to every live `NewHeads` subscriber.
    ///
    /// Must be called once per head, in block order, for delivery to stay
    /// gapless. Returns the number of notifications queued.
    pub fn publish_head(&self, block: &Block) -> usize {
        let result = match serde_json::to_value(block) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to encode block header");
                return 0;
            }
        };

        // Snapshot first so no map guard is held while sending.
        let targets: Vec<(SubscriptionId, Outbound)> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.active && entry.topic == SubscriptionTopic::NewHeads)
            .map(|entry| (entry.key().clone(), entry.sink.clone()))
            .collect();

        let mut delivered = 0;
        let mut dead = Vec::new();
        for (sub_id, sink) in targets {
            let notification = SubscriptionNotification::new(
                SubscriptionTopic::NewHeads.notification_method(),
                &sub_id,
                result.clone(),
            );
            let text = match serde_json::to_string(&notification) {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to encode notification");
                    continue;
                }
            };
            match sink.try_send(text) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(subscription_id = %sub_id, block = block.number, "Outbound queue full, notification dropped");
                }
                Err(TrySendError::Closed(_)) => dead.push(sub_id),
            }
        }

        for sub_id in dead {
            debug!(subscription_id = %sub_id, "Transport closed, dropping subscription");
            self.unsubscribe(&sub_id);
        }

        NOTIFICATIONS_DELIVERED.inc_by(delivered as f64);
        delivered
    }

    fn update_gauge(&self) {
        ACTIVE_SUBSCRIPTIONS.set(self.subscriptions.len() as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_02_chain_sim::build_block;
    use shared_types::rpc::SubscriptionNotification;

    fn registry() -> SubscriptionRegistry {
        SubscriptionRegistry::new(4)
    }

    #[test]
    fn test_subscribe_allocates_unique_ids() {
        let reg = registry();
        let (tx, _rx) = mpsc::channel(8);
        let conn = ConnectionId::new();
        let a = reg
            .subscribe(conn, SubscriptionTopic::NewHeads, tx.clone())
            .unwrap();
        let b = reg.subscribe(conn, SubscriptionTopic::NewHeads, tx).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("0x"));
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.connection_subscriptions(&conn).len(), 2);
    }

    #[test]
    fn test_limit_per_connection() {
        let reg = SubscriptionRegistry::new(1);
        let (tx, _rx) = mpsc::channel(8);
        let conn = ConnectionId::new();
        reg.subscribe(conn, SubscriptionTopic::NewHeads, tx.clone())
            .unwrap();
        assert_eq!(
            reg.subscribe(conn, SubscriptionTopic::NewHeads, tx.clone()),
            Err(SubscribeError::TooManySubscriptions(1))
        );
        // Other connections are unaffected.
        assert!(reg
            .subscribe(ConnectionId::new(), SubscriptionTopic::NewHeads, tx)
            .is_ok());
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let reg = registry();
        let (tx, _rx) = mpsc::channel(8);
        let id = reg
            .subscribe(ConnectionId::new(), SubscriptionTopic::NewHeads, tx)
            .unwrap();
        assert!(reg.unsubscribe(&id));
        assert!(!reg.unsubscribe(&id));
        assert!(!reg.unsubscribe("0xdead"));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_unsubscribe_owned_rejects_foreign() {
        let reg = registry();
        let (tx, _rx) = mpsc::channel(8);
        let owner = ConnectionId::new();
        let id = reg
            .subscribe(owner, SubscriptionTopic::NewHeads, tx)
            .unwrap();
        assert!(!reg.unsubscribe_owned(&ConnectionId::new(), &id));
        assert!(reg.unsubscribe_owned(&owner, &id));
    }

    #[test]
    fn test_publish_delivers_tagged_notification() {
        let reg = registry();
        let (tx, mut rx) = mpsc::channel(8);
        let id = reg
            .subscribe(ConnectionId::new(), SubscriptionTopic::NewHeads, tx)
            .unwrap();

        assert_eq!(reg.publish_head(&build_block(1001)), 1);

        let text = rx.try_recv().unwrap();
        let note: SubscriptionNotification = serde_json::from_str(&text).unwrap();
        assert_eq!(note.method, "chain_newHead");
        assert_eq!(note.params.subscription, id);
        assert_eq!(note.params.result["number"], "0x3e9");
        let raw: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(raw.get("id").is_none());
    }

    #[test]
    fn test_closed_transport_is_dropped() {
        let reg = registry();
        let (tx, rx) = mpsc::channel(8);
        let conn = ConnectionId::new();
        reg.subscribe(conn, SubscriptionTopic::NewHeads, tx).unwrap();
        drop(rx);

        assert_eq!(reg.publish_head(&build_block(1001)), 0);
        assert!(reg.is_empty());
        assert!(reg.connection_subscriptions(&conn).is_empty());
    }

    #[test]
    fn test_remove_connection_stops_delivery() {
        let reg = registry();
        let (tx, mut rx) = mpsc::channel(8);
        let conn = ConnectionId::new();
        reg.subscribe(conn, SubscriptionTopic::NewHeads, tx.clone())
            .unwrap();
        reg.subscribe(conn, SubscriptionTopic::NewHeads, tx).unwrap();

        assert_eq!(reg.remove_connection(&conn), 2);
        assert_eq!(reg.remove_connection(&conn), 0);
        assert_eq!(reg.publish_head(&build_block(1001)), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_pending_subscription_silent_until_activated() {
        let reg = registry();
        let (tx, mut rx) = mpsc::channel(8);
        let conn = ConnectionId::new();
        let id = reg
            .subscribe_pending(conn, SubscriptionTopic::NewHeads, tx)
            .unwrap();

        assert_eq!(reg.publish_head(&build_block(1001)), 0);
        assert!(rx.try_recv().is_err());

        assert_eq!(reg.activate_pending(&conn), 1);
        assert_eq!(reg.activate_pending(&conn), 0);
        assert_eq!(reg.publish_head(&build_block(1002)), 1);
        let note: SubscriptionNotification =
            serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(note.params.subscription, id);
        assert_eq!(note.params.result["number"], "0x3ea");
    }

    #[test]
    fn test_activation_is_per_connection() {
        let reg = registry();
        let (tx, _rx) = mpsc::channel(8);
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        reg.subscribe_pending(a, SubscriptionTopic::NewHeads, tx.clone())
            .unwrap();
        reg.subscribe_pending(b, SubscriptionTopic::NewHeads, tx)
            .unwrap();

        assert_eq!(reg.activate_pending(&a), 1);
        assert_eq!(reg.publish_head(&build_block(1001)), 1);
        assert_eq!(reg.activate_pending(&ConnectionId::new()), 0);
    }

    #[test]
    fn test_delivery_order_follows_publish_order() {
        let reg = registry();
        let (tx, mut rx) = mpsc::channel(8);
        reg.subscribe(ConnectionId::new(), SubscriptionTopic::NewHeads, tx)
            .unwrap();
        for n in 1001..=1003 {
            reg.publish_head(&build_block(n));
        }
        let numbers: Vec<String> = (0..3)
            .map(|_| {
                let note: SubscriptionNotification =
                    serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
                note.params.result["number"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(numbers, vec!["0x3e9", "0x3ea", "0x3eb"]);
    }
}
