//! Client error taxonomy.

use serde::{Deserialize, Serialize};
use shared_types::{codes, RpcErrorObject};
use std::fmt;
use thiserror::Error;

/// Category of a client failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InsufficientFunds,
    Unauthorized,
    NetworkError,
    TransactionFailed,
    InvalidParams,
    WalletNotConnected,
    PoolNotFound,
    ChainNotSupported,
    Timeout,
    ConnectionLost,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InsufficientFunds => "INSUFFICIENT_FUNDS",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::TransactionFailed => "TRANSACTION_FAILED",
            ErrorCode::InvalidParams => "INVALID_PARAMS",
            ErrorCode::WalletNotConnected => "WALLET_NOT_CONNECTED",
            ErrorCode::PoolNotFound => "POOL_NOT_FOUND",
            ErrorCode::ChainNotSupported => "CHAIN_NOT_SUPPORTED",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::ConnectionLost => "CONNECTION_LOST",
        };
        f.write_str(name)
    }
}

/// A typed client failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct ClientError {
    code: ErrorCode,
    message: String,
}

impl ClientError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConnectionLost, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }
}

impl From<RpcErrorObject> for ClientError {
    fn from(error: RpcErrorObject) -> Self {
        let code = match error.code {
            codes::POOL_NOT_FOUND => ErrorCode::PoolNotFound,
            codes::INSUFFICIENT_BALANCE => ErrorCode::InsufficientFunds,
            codes::CHAIN_NOT_SUPPORTED => ErrorCode::ChainNotSupported,
            codes::INVALID_PARAMS => ErrorCode::InvalidParams,
            _ => ErrorCode::TransactionFailed,
        };
        Self::new(code, format!("RPC error {}: {}", error.code, error.message))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::timeout(error.to_string())
        } else {
            Self::network(error.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match error {
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                Self::connection_lost(error.to_string())
            }
            other => Self::network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        Self::network(format!("malformed payload: {error}"))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
