//! # Wire Codecs
//!
//! Serde helpers for values whose JSON shape differs from their Rust shape,
//! plus the placeholder hash derivation used for synthetic identifiers.

use primitive_types::{H256, U256};
use sha3::{Digest, Keccak256};

/// `U256` as a decimal string.
///
/// Accepts a decimal string, a `0x`-prefixed hex string or a plain JSON
/// number on input.
pub mod u256_dec {
    use primitive_types::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(U256::from(n)),
            Repr::Text(s) => parse(&s).map_err(serde::de::Error::custom),
        }
    }

    pub(crate) fn parse(s: &str) -> Result<U256, String> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            U256::from_str_radix(hex, 16).map_err(|e| format!("invalid hex amount {s}: {e:?}"))
        } else {
            U256::from_dec_str(s).map_err(|e| format!("invalid decimal amount {s}: {e:?}"))
        }
    }
}

/// `u64` as a `0x`-prefixed hex string, the way block numbers appear in
/// Substrate-style headers.
pub mod hex_u64 {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{value:x}"))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(n) => Ok(n),
            Repr::Text(s) => super::parse_hex_u64(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Durations as `"6s"`, `"500ms"`, `"1m"`, or plain seconds.
pub mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let ms = duration.as_millis();
        if ms % 1000 == 0 {
            serializer.serialize_str(&format!("{}s", ms / 1000))
        } else {
            serializer.serialize_str(&format!("{ms}ms"))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub fn parse(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        let number = |digits: &str| {
            digits
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid duration {s}: {e}"))
        };
        if let Some(ms) = s.strip_suffix("ms") {
            Ok(Duration::from_millis(number(ms)?))
        } else if let Some(secs) = s.strip_suffix('s') {
            Ok(Duration::from_secs(number(secs)?))
        } else if let Some(mins) = s.strip_suffix('m') {
            Ok(Duration::from_secs(number(mins)? * 60))
        } else {
            Ok(Duration::from_secs(number(s)?))
        }
    }
}

/// Parse a `0x`-prefixed (or bare) hex string into a `u64`.
pub fn parse_hex_u64(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("invalid hex number {s}: {e}"))
}

/// Parse a big amount from its wire form (decimal or `0x` hex).
pub fn parse_amount(s: &str) -> Result<U256, String> {
    u256_dec::parse(s)
}

/// Deterministic placeholder hash for `(domain, n)`.
///
/// Used for block hashes and state roots: same input, same hash.
pub fn placeholder_hash(domain: &str, n: u64) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(domain.as_bytes());
    hasher.update(n.to_be_bytes());
    H256::from_slice(&hasher.finalize())
}

/// Fresh, unique opaque hash (transaction hashes and the like).
pub fn random_hash() -> H256 {
    let id = uuid::Uuid::new_v4();
    let mut hasher = Keccak256::new();
    hasher.update(id.as_bytes());
    H256::from_slice(&hasher.finalize())
}

/// `0x` + 64 hex digits with `n` right-aligned, matching the mock parent hash
/// format.
pub fn padded_hash(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}
