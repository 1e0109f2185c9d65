//! Session configuration.

use serde::{Deserialize, Serialize};
use shared_types::codec::duration_str;
use std::time::Duration;

use crate::error::{ClientError, ErrorCode};

/// Client session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Push channel endpoint
    pub endpoint: String,
    /// Request/response endpoint
    pub rpc_endpoint: String,
    /// Upper bound on waiting for a sponsored transaction
    #[serde(with = "duration_str")]
    pub request_timeout: Duration,
    /// Delay before the single reconnect attempt after the push channel drops
    #[serde(with = "duration_str")]
    pub reconnect_delay: Duration,
    /// Period of the fallback polling ticker
    #[serde(with = "duration_str")]
    pub poll_interval: Duration,
    /// Chance per polling tick of a synthetic savings increment
    pub poll_probability: f64,
    /// Handshake attempts before falling back
    pub handshake_attempts: u32,
    /// Base delay of the handshake backoff
    #[serde(with = "duration_str")]
    pub handshake_backoff: Duration,
    /// Records kept in the history ring buffer
    pub history_capacity: usize,
    /// Artificial signing/inclusion delay of the simulated backend
    pub simulated_latency: LatencyRange,
    /// Seed of the simulated backend and polling ticker; random when unset
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            endpoint: "ws://localhost:9944".to_string(),
            rpc_endpoint: "http://localhost:9933".to_string(),
            request_timeout: Duration::from_secs(30),
            reconnect_delay: Duration::from_secs(5),
            poll_interval: Duration::from_secs(3),
            poll_probability: 0.1,
            handshake_attempts: 2,
            handshake_backoff: Duration::from_millis(250),
            history_capacity: 100,
            simulated_latency: LatencyRange::default(),
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Demo profile: the simulated backend takes 800-1200ms per transaction.
    pub fn demo() -> Self {
        Self {
            simulated_latency: LatencyRange {
                min: Duration::from_millis(800),
                max: Duration::from_millis(1200),
            },
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.request_timeout.is_zero() {
            return Err(invalid("request_timeout must be non-zero"));
        }
        if self.poll_interval.is_zero() {
            return Err(invalid("poll_interval must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.poll_probability) {
            return Err(invalid("poll_probability must be within 0..=1"));
        }
        if self.handshake_attempts == 0 {
            return Err(invalid("handshake_attempts must be at least 1"));
        }
        if self.history_capacity == 0 {
            return Err(invalid("history_capacity must be non-zero"));
        }
        if self.simulated_latency.min > self.simulated_latency.max {
            return Err(invalid("simulated_latency min exceeds max"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ClientError {
    ClientError::new(ErrorCode::InvalidParams, message)
}

/// Inclusive latency range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LatencyRange {
    #[serde(with = "duration_str")]
    pub min: Duration,
    #[serde(with = "duration_str")]
    pub max: Duration,
}
