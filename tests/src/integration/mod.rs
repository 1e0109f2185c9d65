//! Integration scenarios.

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod client_session;
#[cfg(test)]
mod node_rpc;
#[cfg(test)]
mod subscriptions;
