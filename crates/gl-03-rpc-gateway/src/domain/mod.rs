//! Domain layer for the RPC gateway.

pub mod config;
pub mod connection;
pub mod error;
pub mod methods;

pub use config::*;
pub use connection::ConnectionId;
pub use error::*;
pub use methods::*;
