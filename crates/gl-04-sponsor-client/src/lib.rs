//! # GasLeap Sponsor Client
//!
//! Client-side session layer: keeps one connection to a GasLeap node (or a
//! local simulator when the node is unreachable), issues sponsored
//! transactions, and tracks cumulative gas savings in real time.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  TransactionIssuer: validate → sign → sponsor under deadline      │
//! └──────────────┬────────────────────────────────────────────────────┘
//!                ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Session                                                          │
//! │  state machine · wallet binding · savings counter · HistoryLedger │
//! └──────┬────────────────────────┬───────────────────────┬───────────┘
//!        ▼                        ▼                       ▼
//! ┌──────────────┐   ┌─────────────────────────┐   ┌──────────────────┐
//! │ SponsorBackend│  │ PushConnector           │   │ EventBus         │
//! │ RpcBackend   │   │ WsConnector → new heads │   │ on / subscribe   │
//! │ Simulated    │   │ polling ticker fallback │   │                  │
//! └──────────────┘   └─────────────────────────┘   └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use gl_04_sponsor_client::{Session, SessionConfig, SponsorParams, TransactionIssuer};
//! use shared_types::{ChainId, PoolId};
//!
//! # async fn demo() -> Result<(), gl_04_sponsor_client::ClientError> {
//! let session = Session::new(SessionConfig::default())?;
//! session.connect().await;
//!
//! let issuer = TransactionIssuer::new(session.clone());
//! let result = issuer
//!     .submit(SponsorParams {
//!         pool_id: PoolId::from("demo-pool-1"),
//!         target_chain: ChainId(2000),
//!         call_data: serde_json::json!({"method": "transfer"}),
//!     })
//!     .await;
//! println!("saved {} gas, total {}", result.gas_saved, session.gas_savings());
//! session.disconnect();
//! # Ok(())
//! # }
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod backend;
pub mod config;
pub mod error;
pub mod history;
pub mod issuer;
pub mod session;
pub mod transport;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{NodeInfo, RpcBackend, SimulatedBackend, SponsorBackend, SponsorRequest};
pub use config::{LatencyRange, SessionConfig};
pub use error::{ClientError, ClientResult, ErrorCode};
pub use history::{HistoryEntry, HistoryLedger, Trend};
pub use issuer::{SponsorParams, TransactionIssuer, TransactionResult};
pub use session::{ConnectionInfo, GasSavingsInfo, SavingsWithUpdates, Session, SessionBuilder};
pub use transport::{PushChannel, PushConnector, PushFrame, WsConnector};
pub use wallet::{MockSigner, Signer, WalletAccount, WalletConnection};
