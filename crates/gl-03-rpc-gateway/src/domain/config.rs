//! Gateway configuration.

use gl_01_ledger::SponsorshipPolicy;
use serde::{Deserialize, Serialize};
use shared_types::codec::duration_str;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Complete node configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP JSON-RPC server
    pub http: HttpConfig,
    /// WebSocket JSON-RPC server with push subscriptions
    pub websocket: WebSocketConfig,
    /// Simulated chain identity and block timing
    pub chain: ChainConfig,
    /// Gas range and failure handling for sponsored transactions
    pub sponsorship: SponsorshipPolicy,
    /// CORS settings for the HTTP server
    pub cors: CorsConfig,
    /// Request limits
    pub limits: LimitsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.enabled && self.websocket.enabled && self.http.port == self.websocket.port
            && self.http.port != 0
        {
            return Err(ConfigError::DuplicatePorts);
        }

        if self.chain.block_time.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "block_time must be > 0".to_string(),
            ));
        }

        self.sponsorship
            .validate()
            .map_err(|e| ConfigError::InvalidGasRange(e.to_string()))?;

        if self.websocket.message_buffer_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "message_buffer_size must be > 0".to_string(),
            ));
        }

        if self.websocket.max_subscriptions_per_connection == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_subscriptions_per_connection must be > 0".to_string(),
            ));
        }

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    pub fn ws_addr(&self) -> SocketAddr {
        SocketAddr::new(self.websocket.host, self.websocket.port)
    }

    /// Loopback-only config on ephemeral ports.
    pub fn ephemeral() -> Self {
        let mut config = Self::default();
        config.http.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.http.port = 0;
        config.websocket.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.websocket.port = 0;
        config
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 9933)
    pub port: u16,
    /// Enable HTTP server
    pub enabled: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 9933,
            enabled: true,
        }
    }
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSocketConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 9944)
    pub port: u16,
    /// Enable WebSocket server
    pub enabled: bool,
    /// Max subscriptions per connection
    pub max_subscriptions_per_connection: usize,
    /// Outbound queue per connection
    pub message_buffer_size: usize,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 9944,
            enabled: true,
            max_subscriptions_per_connection: 16,
            message_buffer_size: 1024,
        }
    }
}

/// Chain identity reported by `system_*` and the block period.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// `system_name`
    pub name: String,
    /// `system_chain`
    pub chain: String,
    /// `system_version`
    pub version: String,
    /// Head number at start
    pub base_block: u64,
    /// Block production period
    #[serde(with = "duration_str")]
    pub block_time: Duration,
    /// Seed `demo-pool-1` at start
    pub seed_demo_pool: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: "GasLeap Mock Parachain".to_string(),
            chain: "MockChain".to_string(),
            version: "1.0.0-mock".to_string(),
            base_block: gl_02_chain_sim::DEFAULT_BASE_BLOCK,
            block_time: gl_02_chain_sim::DEFAULT_BLOCK_TIME,
            seed_demo_pool: true,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max HTTP request body in bytes
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// HTTP and WebSocket servers on the same port
    #[error("duplicate ports configured")]
    DuplicatePorts,
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid duration value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Empty or inverted gas range
    #[error("invalid gas range: {0}")]
    InvalidGasRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.http_addr().port(), 9933);
        assert_eq!(config.ws_addr().port(), 9944);
        assert_eq!(config.chain.block_time, Duration::from_secs(6));
    }

    #[test]
    fn test_duplicate_ports_detected() {
        let mut config = GatewayConfig::default();
        config.websocket.port = config.http.port;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicatePorts)
        ));
    }

    #[test]
    fn test_ephemeral_ports_not_duplicates() {
        assert!(GatewayConfig::ephemeral().validate().is_ok());
    }

    #[test]
    fn test_zero_block_time_rejected() {
        let mut config = GatewayConfig::default();
        config.chain.block_time = Duration::ZERO;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_inverted_gas_range_rejected() {
        let mut config = GatewayConfig::default();
        config.sponsorship.gas_cost_min = 200;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGasRange(_))
        ));
    }

    #[test]
    fn test_zero_buffer_rejected() {
        let mut config = GatewayConfig::default();
        config.websocket.message_buffer_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidLimit(_))
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{"chain": {"chain": "Rococo", "block_time": "250ms"}, "sponsorship": {"gas_cost_max": 90}}"#,
        )
        .unwrap();
        assert_eq!(config.chain.chain, "Rococo");
        assert_eq!(config.chain.name, "GasLeap Mock Parachain");
        assert_eq!(config.chain.block_time, Duration::from_millis(250));
        assert_eq!(config.sponsorship.gas_cost_max, 90);
        assert_eq!(config.sponsorship.gas_cost_min, 50);
        assert_eq!(config.http.port, 9933);
    }
}
