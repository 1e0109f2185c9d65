//! Formatting helpers, the chain catalogue and retry with backoff.

use shared_types::{ChainId, Timestamp, U256};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// A target chain known to the demo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    pub id: ChainId,
    pub name: &'static str,
    pub slug: &'static str,
}

/// Target chains offered by the demo.
pub const DEMO_CHAINS: [ChainInfo; 4] = [
    ChainInfo {
        id: ChainId(1000),
        name: "Astar",
        slug: "astar",
    },
    ChainInfo {
        id: ChainId(2000),
        name: "Acala",
        slug: "acala",
    },
    ChainInfo {
        id: ChainId(2004),
        name: "Moonbeam",
        slug: "moonbeam",
    },
    ChainInfo {
        id: ChainId(2006),
        name: "Astar",
        slug: "astar-evm",
    },
];

/// Resolves a chain from its slug, its display name or its numeric id.
pub fn resolve_chain(input: &str) -> Option<ChainId> {
    let input = input.trim();
    if let Ok(id) = input.parse::<u32>() {
        return is_valid_parachain_id(id).then_some(ChainId(id));
    }
    DEMO_CHAINS
        .iter()
        .find(|c| c.slug.eq_ignore_ascii_case(input) || c.name.eq_ignore_ascii_case(input))
        .map(|c| c.id)
}

/// Catalogue entry for a chain id.
pub fn chain_info(id: ChainId) -> Option<&'static ChainInfo> {
    DEMO_CHAINS.iter().find(|c| c.id == id)
}

/// Relay-chain parachain ids live in `1..4096`.
pub fn is_valid_parachain_id(id: u32) -> bool {
    id > 0 && id < 4096
}

/// `999`, `1.5K`, `2.3M`.
pub fn format_gas_savings(savings: u64) -> String {
    if savings < 1_000 {
        savings.to_string()
    } else if savings < 1_000_000 {
        format!("{:.1}K", savings as f64 / 1_000.0)
    } else {
        format!("{:.1}M", savings as f64 / 1_000_000.0)
    }
}

/// Renders a base-unit balance in whole tokens, at most four decimals,
/// trailing zeros dropped.
pub fn format_balance(balance: U256, decimals: u32) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let scale = U256::from(10_000u64);
    let half = divisor / U256::from(2u64);

    let scaled = match balance.checked_mul(scale).and_then(|v| v.checked_add(half)) {
        Some(v) => v / divisor,
        // Too large to scale: drop the fraction.
        None => (balance / divisor) * scale,
    };

    let whole = scaled / scale;
    let frac = (scaled % scale).low_u64();
    if frac == 0 {
        return whole.to_string();
    }
    let frac = format!("{frac:04}");
    format!("{whole}.{}", frac.trim_end_matches('0'))
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> Timestamp {
    chrono::Utc::now().timestamp_millis().max(0) as Timestamp
}

/// Runs `op` up to `attempts` times, sleeping `base * 2^(n-1)` after the
/// n-th failure.
pub async fn retry_with_backoff<T, F, Fut>(
    attempts: u32,
    base_delay: Duration,
    mut op: F,
) -> ClientResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ClientResult<T>>,
{
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                debug!(attempt, error = %e, "Attempt failed");
                last_error = Some(e);
            }
        }
        if attempt < attempts {
            let factor = 1u32 << (attempt - 1).min(16);
            tokio::time::sleep(base_delay.saturating_mul(factor)).await;
        }
    }

    let reason = last_error.map_or_else(|| "unknown error".to_string(), |e| e.to_string());
    Err(ClientError::network(format!(
        "Failed after {attempts} attempts: {reason}"
    )))
}
