//! Transaction issuer.
//!
//! Validates a sponsorship, signs it with the bound wallet, hands it to the
//! active backend under a deadline and applies the outcome to the session.
//! Every failure comes back as a [`TransactionResult`]; nothing is thrown
//! and nothing is recorded for a failed attempt.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ChainId, ConnectionMode, PoolId};
use tracing::{info, warn};

use crate::backend::SponsorRequest;
use crate::error::{ClientError, ClientResult, ErrorCode};
use crate::session::Session;
use crate::utils::is_valid_parachain_id;

/// What the caller wants sponsored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorParams {
    pub pool_id: PoolId,
    pub target_chain: ChainId,
    pub call_data: Value,
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub success: bool,
    pub tx_hash: String,
    pub gas_saved: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl TransactionResult {
    fn failed(error: &ClientError) -> Self {
        Self {
            success: false,
            tx_hash: String::new(),
            gas_saved: 0,
            error: Some(error.message().to_string()),
            error_code: Some(error.code()),
            transaction_id: None,
        }
    }
}

/// Issues sponsored transactions through a [`Session`].
#[derive(Clone)]
pub struct TransactionIssuer {
    session: Session,
}

impl TransactionIssuer {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Submits one sponsorship and waits for its outcome.
    pub async fn submit(&self, params: SponsorParams) -> TransactionResult {
        match self.try_submit(&params).await {
            Ok(result) => result,
            Err(e) => {
                warn!(
                    pool = %params.pool_id,
                    chain = params.target_chain.0,
                    code = %e.code(),
                    error = %e.message(),
                    "Sponsored transaction failed"
                );
                TransactionResult::failed(&e)
            }
        }
    }

    async fn try_submit(&self, params: &SponsorParams) -> ClientResult<TransactionResult> {
        validate(params)?;

        let (wallet, signer) = self.session.ensure_ready().await;
        let backend = self.session.active_backend();

        let mut request = SponsorRequest {
            pool_id: params.pool_id.clone(),
            target_chain: params.target_chain,
            call_data: params.call_data.clone(),
            user: wallet.account.address.clone(),
            signature: None,
        };
        if backend.mode() == ConnectionMode::Blockchain {
            let signature = signer
                .sign(&wallet.account.address, &request.signing_payload())
                .await?;
            request.signature = Some(signature);
        }

        let deadline = self.session.config().request_timeout;
        let outcome = tokio::time::timeout(deadline, backend.sponsor(&request))
            .await
            .map_err(|_| {
                ClientError::timeout(format!(
                    "Transaction timed out after {}ms",
                    deadline.as_millis()
                ))
            })??;

        let record = self
            .session
            .record_success(&params.pool_id, params.target_chain, &outcome);
        info!(
            id = %record.id,
            tx_hash = %record.tx_hash,
            gas_saved = record.gas_saved,
            mode = ?backend.mode(),
            "Sponsored transaction completed"
        );

        Ok(TransactionResult {
            success: true,
            tx_hash: outcome.tx_hash,
            gas_saved: outcome.gas_saved,
            error: None,
            error_code: None,
            transaction_id: Some(record.id),
        })
    }
}

fn validate(params: &SponsorParams) -> ClientResult<()> {
    if params.pool_id.0.trim().is_empty() {
        return Err(ClientError::invalid_params("Pool ID is required"));
    }
    if !is_valid_parachain_id(params.target_chain.0) {
        return Err(ClientError::invalid_params(format!(
            "Invalid parachain ID: {}",
            params.target_chain.0
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::testing::{ScriptedConnector, StubNode};
    use shared_bus::EventKind;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn params() -> SponsorParams {
        SponsorParams {
            pool_id: PoolId::from("demo-pool-1"),
            target_chain: ChainId(2000),
            call_data: serde_json::json!({"method": "transfer", "amount": "1000"}),
        }
    }

    fn fallback_session() -> Session {
        Session::builder(SessionConfig {
            seed: Some(11),
            poll_probability: 0.0,
            ..SessionConfig::default()
        })
        .build()
        .unwrap()
    }

    fn node_session(node: Arc<StubNode>) -> Session {
        let (connector, _accepted) = ScriptedConnector::new();
        connector.set_refuse(true);
        Session::builder(SessionConfig {
            seed: Some(11),
            poll_probability: 0.0,
            ..SessionConfig::default()
        })
        .remote(node)
        .connector(connector)
        .build()
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_submission_records_history() {
        let session = fallback_session();
        let issuer = TransactionIssuer::new(session.clone());

        let result = issuer.submit(params()).await;
        assert!(result.success);
        assert!((5..=54).contains(&result.gas_saved));
        assert!(result.tx_hash.starts_with("0x"));
        assert_eq!(result.error_code, None);

        assert_eq!(session.gas_savings(), result.gas_saved);
        let history = session.history(10);
        assert_eq!(history.len(), 1);
        assert_eq!(Some(history[0].record.id.clone()), result.transaction_id);
        assert!(session.wallet().unwrap().is_mock);
        session.disconnect();
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_is_capped() {
        let session = fallback_session();
        let issuer = TransactionIssuer::new(session.clone());

        let mut ids = Vec::new();
        let mut total = 0;
        for _ in 0..101 {
            let result = issuer.submit(params()).await;
            assert!(result.success);
            total += result.gas_saved;
            ids.extend(result.transaction_id);
        }

        assert_eq!(session.history_len(), 100);
        assert_eq!(session.gas_savings(), total);
        let kept = session.history(200);
        assert_eq!(kept[0].record.id, ids[100]);
        assert!(kept.iter().all(|e| e.record.id != ids[0]));
        session.disconnect();
    }

    #[tokio::test(start_paused = true)]
    async fn test_events_fire_once_per_submission() {
        let session = fallback_session();
        let issuer = TransactionIssuer::new(session.clone());

        let counts: Arc<[AtomicUsize; 3]> = Arc::new(Default::default());
        for (slot, kind) in [
            EventKind::GasSavingsUpdated,
            EventKind::TransactionCompleted,
            EventKind::TransactionHistoryUpdated,
        ]
        .into_iter()
        .enumerate()
        {
            let counts = Arc::clone(&counts);
            session.events().on(kind, move |_| {
                counts[slot].fetch_add(1, Ordering::SeqCst);
            });
        }

        issuer.submit(params()).await;
        for count in counts.iter() {
            assert_eq!(count.load(Ordering::SeqCst), 1);
        }
        session.disconnect();
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_leaves_state_untouched() {
        let node = Arc::new(StubNode {
            delay: Duration::from_secs(60),
            ..StubNode::new()
        });
        let session = node_session(node);
        let issuer = TransactionIssuer::new(session.clone());

        let started = tokio::time::Instant::now();
        let result = issuer.submit(params()).await;
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::Timeout));
        assert!(started.elapsed() >= Duration::from_secs(30));
        assert!(started.elapsed() < Duration::from_secs(60));
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.gas_savings(), 0);
        session.disconnect();
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_params_rejected_before_connecting() {
        let session = fallback_session();
        let issuer = TransactionIssuer::new(session.clone());

        let result = issuer
            .submit(SponsorParams {
                pool_id: PoolId::from(""),
                ..params()
            })
            .await;
        assert_eq!(result.error_code, Some(ErrorCode::InvalidParams));

        let result = issuer
            .submit(SponsorParams {
                target_chain: ChainId(5000),
                ..params()
            })
            .await;
        assert_eq!(result.error_code, Some(ErrorCode::InvalidParams));
        assert_eq!(result.error.as_deref(), Some("Invalid parachain ID: 5000"));

        assert_eq!(session.state(), shared_types::ConnectionState::Disconnected);
        assert!(session.wallet().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_node_submission_is_signed() {
        let node = Arc::new(StubNode::new());
        let session = node_session(node.clone());
        let issuer = TransactionIssuer::new(session.clone());

        let result = issuer.submit(params()).await;
        assert!(result.success);
        assert_eq!(result.gas_saved, 100);

        let requests = node.requests.lock();
        assert_eq!(requests.len(), 1);
        let signature = requests[0].signature.as_deref().unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(requests[0].user.as_str(), crate::wallet::DEMO_ADDRESS);
        drop(requests);
        session.disconnect();
    }

    #[tokio::test(start_paused = true)]
    async fn test_node_rejection_is_reported() {
        let node = Arc::new(StubNode {
            failure: Some(ErrorCode::PoolNotFound),
            ..StubNode::new()
        });
        let session = node_session(node);
        let issuer = TransactionIssuer::new(session.clone());

        let result = issuer.submit(params()).await;
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::PoolNotFound));
        assert_eq!(result.tx_hash, "");
        assert_eq!(session.history_len(), 0);
        session.disconnect();
    }
}
