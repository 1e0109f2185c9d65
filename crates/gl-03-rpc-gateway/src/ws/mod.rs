//! WebSocket transport and push subscriptions.

pub mod handler;
pub mod subscriptions;

pub use handler::handle_socket;
pub use subscriptions::{Outbound, SubscribeError, SubscriptionId, SubscriptionRegistry};
