//! # Session Types
//!
//! Client-side records: the connection state machine, the operating mode and
//! the bounded history of sponsored transactions.

use serde::{Deserialize, Serialize};

use crate::entities::{ChainId, PoolId, Timestamp};

/// Connection lifecycle of a client session.
///
/// `Disconnected -> Connecting -> Connected`, with `Error` reachable from
/// `Connecting` or `Connected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl ConnectionState {
    /// Whether `self -> next` is an edge of the lifecycle.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Disconnected, Connecting)
                | (Connecting, Connected)
                | (Connecting, Error)
                | (Connected, Error)
                | (Error, Connecting)
                | (_, Disconnected)
        )
    }
}

/// Where answers come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionMode {
    /// Answers come from a real node.
    Blockchain,
    /// Answers are synthesized locally.
    #[default]
    Fallback,
}

/// Where savings updates come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StreamSource {
    /// Push channel to the node is open.
    Push,
    /// Local probabilistic ticker; data is synthetic.
    Polling,
    #[default]
    None,
}

/// Status of a client-side record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Completed,
    Pending,
    Failed,
}

/// One entry of the client's bounded history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub target_chain: ChainId,
    pub pool_id: PoolId,
    pub gas_saved: u64,
    pub tx_hash: String,
    pub timestamp: Timestamp,
    pub status: RecordStatus,
}

/// Activity pushed to clients outside the JSON-RPC envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityMessage {
    GasSavingsUpdated {
        #[serde(rename = "totalSavings")]
        total_savings: u64,
        #[serde(default)]
        increment: u64,
    },
    TransactionCompleted(TransactionRecord),
}
