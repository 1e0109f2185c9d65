//! Wallet binding.
//!
//! A session first asks an external signer for accounts. When there is no
//! signer, it has no accounts, or discovery fails, the session binds the
//! built-in demo identity instead. Callers receive the same
//! [`WalletConnection`] either way; `is_mock` says which path was taken.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use shared_types::AccountId;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::ClientResult;

/// Address of the demo identity (`//Alice`).
pub const DEMO_ADDRESS: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";

/// An account exposed by a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub address: AccountId,
    pub name: String,
    pub source: String,
}

/// The bound wallet, real or mock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletConnection {
    pub account: WalletAccount,
    pub wallet_name: String,
    pub is_connected: bool,
    pub is_mock: bool,
}

/// An external signer (browser extension, keystore, hardware wallet).
#[async_trait]
pub trait Signer: Send + Sync {
    /// Display name of the wallet.
    fn name(&self) -> &str;

    /// Accounts the signer is willing to expose to `app_name`.
    async fn accounts(&self, app_name: &str) -> ClientResult<Vec<WalletAccount>>;

    /// Signs `payload` for `account`; returns a `0x` hex signature.
    async fn sign(&self, account: &AccountId, payload: &[u8]) -> ClientResult<String>;
}

/// Deterministic signer behind the demo identity.
///
/// Signatures are `keccak256(address || payload)`; they identify the
/// payload but prove nothing.
#[derive(Debug, Default)]
pub struct MockSigner;

#[async_trait]
impl Signer for MockSigner {
    fn name(&self) -> &str {
        "Mock Wallet"
    }

    async fn accounts(&self, _app_name: &str) -> ClientResult<Vec<WalletAccount>> {
        Ok(vec![demo_account()])
    }

    async fn sign(&self, account: &AccountId, payload: &[u8]) -> ClientResult<String> {
        let mut hasher = Keccak256::new();
        hasher.update(account.as_str().as_bytes());
        hasher.update(payload);
        Ok(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

pub fn demo_account() -> WalletAccount {
    WalletAccount {
        address: AccountId::from(DEMO_ADDRESS),
        name: "Demo Account".to_string(),
        source: "mock-wallet".to_string(),
    }
}

/// Binds the first account of `external`, or the demo identity.
pub async fn bind_wallet(
    external: Option<Arc<dyn Signer>>,
    app_name: &str,
) -> (WalletConnection, Arc<dyn Signer>) {
    if let Some(signer) = external {
        match signer.accounts(app_name).await {
            Ok(accounts) => {
                if let Some(account) = accounts.into_iter().next() {
                    info!(wallet = signer.name(), account = %account.name, "Connected to wallet");
                    let connection = WalletConnection {
                        account,
                        wallet_name: signer.name().to_string(),
                        is_connected: true,
                        is_mock: false,
                    };
                    return (connection, signer);
                }
                warn!(wallet = signer.name(), "No accounts found in wallet, using mock wallet");
            }
            Err(e) => warn!(error = %e, "Wallet connection failed, using mock wallet"),
        }
    } else {
        warn!("No wallet extension found, using mock wallet");
    }

    let signer: Arc<dyn Signer> = Arc::new(MockSigner);
    let connection = WalletConnection {
        account: demo_account(),
        wallet_name: signer.name().to_string(),
        is_connected: true,
        is_mock: true,
    };
    info!("Mock wallet enabled");
    (connection, signer)
}
