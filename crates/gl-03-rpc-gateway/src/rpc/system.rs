//! System JSON-RPC methods.

use crate::domain::config::ChainConfig;
use shared_types::SystemHealth;
use tracing::instrument;

/// System RPC methods handler
pub struct SystemRpc {
    config: ChainConfig,
}

impl SystemRpc {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    /// system_name
    #[instrument(skip(self))]
    pub fn name(&self) -> String {
        self.config.name.clone()
    }

    /// system_version
    #[instrument(skip(self))]
    pub fn version(&self) -> String {
        self.config.version.clone()
    }

    /// system_chain
    #[instrument(skip(self))]
    pub fn chain(&self) -> String {
        self.config.chain.clone()
    }

    /// system_health - a simulated node is always synced with a few peers
    #[instrument(skip(self))]
    pub fn health(&self) -> SystemHealth {
        SystemHealth {
            peers: 3,
            is_syncing: false,
            should_have_peers: true,
        }
    }
}
