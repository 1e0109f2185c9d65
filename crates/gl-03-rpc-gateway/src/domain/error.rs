//! Gateway error types with JSON-RPC 2.0 error codes.

use gl_01_ledger::LedgerError;
use serde::Serialize;
use shared_types::rpc::codes;
use shared_types::RpcErrorObject;
use std::fmt;

/// A JSON-RPC error as returned to callers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: i32, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    // Standard JSON-RPC errors

    /// Parse error - invalid JSON
    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(
            codes::PARSE_ERROR,
            format!("Parse error: {}", details.into()),
        )
    }

    /// Invalid request - not a valid JSON-RPC request
    pub fn invalid_request(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_REQUEST,
            format!("Invalid request: {}", details.into()),
        )
    }

    /// Method not found
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            codes::METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        )
    }

    pub fn invalid_params(details: impl Into<String>) -> Self {
        Self::new(
            codes::INVALID_PARAMS,
            format!("Invalid params: {}", details.into()),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(
            codes::INTERNAL_ERROR,
            format!("Internal error: {}", details.into()),
        )
    }

    // Domain errors

    pub fn pool_not_found(pool_id: impl fmt::Display) -> Self {
        Self::new(
            codes::POOL_NOT_FOUND,
            format!("Pool not found: {}", pool_id),
        )
    }

    /// Subscription or request size limit hit
    pub fn limit_exceeded(limit: impl Into<String>) -> Self {
        Self::new(
            codes::LIMIT_EXCEEDED,
            format!("Limit exceeded: {}", limit.into()),
        )
    }

    pub fn insufficient_balance(details: impl Into<String>) -> Self {
        Self::new(codes::INSUFFICIENT_BALANCE, details.into())
    }

    pub fn chain_not_supported(details: impl Into<String>) -> Self {
        Self::new(codes::CHAIN_NOT_SUPPORTED, details.into())
    }

    /// Wire form for a response envelope.
    pub fn into_object(self) -> RpcErrorObject {
        RpcErrorObject {
            code: self.code,
            message: self.message,
            data: self.data,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let fields = if self.data.is_some() { 3 } else { 2 };
        let mut state = serializer.serialize_struct("ApiError", fields)?;
        state.serialize_field("code", &self.code)?;
        state.serialize_field("message", &self.message)?;
        if let Some(ref data) = self.data {
            state.serialize_field("data", data)?;
        }
        state.end()
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            ApiError::parse_error(e.to_string())
        } else {
            ApiError::invalid_params(e.to_string())
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::PoolNotFound(id) => ApiError::pool_not_found(id),
            LedgerError::InsufficientBalance { .. } => ApiError::insufficient_balance(e.to_string()),
            LedgerError::ChainNotSupported { .. } => ApiError::chain_not_supported(e.to_string()),
            LedgerError::Overflow(_) | LedgerError::InvalidGasRange { .. } => {
                ApiError::internal(e.to_string())
            }
        }
    }
}

/// Result type for RPC handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and shutdown, never sent to callers)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server bind error: {0}")]
    Bind(String),

    #[error("internal error: {0}")]
    Internal(String),
}
