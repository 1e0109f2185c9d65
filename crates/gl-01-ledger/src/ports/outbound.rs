//! Outbound (Driven) ports for the ledger.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::Timestamp;

/// Source of gas costs for sponsored transactions.
pub trait GasOracle: Send {
    /// Draw a cost from the inclusive range `min..=max`.
    fn draw(&mut self, min: u64, max: u64) -> u64;
}

/// Uniform random gas costs.
pub struct RandomGasOracle {
    rng: StdRng,
}

impl RandomGasOracle {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl GasOracle for RandomGasOracle {
    fn draw(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        self.rng.gen_range(min..=max)
    }
}

/// Replays scripted costs, clamped into the range, then repeats the last one.
#[derive(Debug, Clone)]
pub struct FixedGasOracle {
    costs: VecDeque<u64>,
    last: u64,
}

impl FixedGasOracle {
    pub fn new(costs: impl IntoIterator<Item = u64>) -> Self {
        let costs: VecDeque<u64> = costs.into_iter().collect();
        let last = costs.back().copied().unwrap_or(0);
        Self { costs, last }
    }
}

impl GasOracle for FixedGasOracle {
    fn draw(&mut self, min: u64, max: u64) -> u64 {
        let cost = self.costs.pop_front().unwrap_or(self.last);
        cost.clamp(min, max.max(min))
    }
}

/// Time source for consistent timestamp handling.
pub trait TimeSource: Send + Sync {
    /// Returns the current timestamp in milliseconds.
    fn now(&self) -> Timestamp;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time
            .fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
