//! Bounded history of completed sponsorships and the statistics derived
//! from it.
//!
//! Records are kept newest first. Statistics are recomputed on every call;
//! nothing derived is stored.

use serde::{Deserialize, Serialize};
use shared_types::{RecordStatus, Timestamp, TransactionRecord};
use std::collections::VecDeque;

pub const DAY_MS: u64 = 24 * 60 * 60 * 1000;
pub const WEEK_MS: u64 = 7 * DAY_MS;

/// Records compared on each side of the trend window.
const TREND_WINDOW: usize = 5;

/// Direction of recent savings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Count and sum of `gas_saved` over a time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowTotals {
    pub count: usize,
    pub total: u64,
}

impl WindowTotals {
    pub fn average(&self) -> f64 {
        self.total as f64 / self.count.max(1) as f64
    }
}

/// Fixed-capacity ring buffer of client transaction records.
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    records: VecDeque<TransactionRecord>,
    capacity: usize,
}

impl HistoryLedger {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Inserts as the newest record; returns the evicted oldest one when
    /// the buffer was full.
    pub fn push(&mut self, record: TransactionRecord) -> Option<TransactionRecord> {
        self.records.push_front(record);
        if self.records.len() > self.capacity {
            self.records.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.records.iter()
    }

    pub fn recent(&self, limit: usize) -> Vec<TransactionRecord> {
        self.records.iter().take(limit).cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Mean of the five newest records against the mean of the five before
    /// them, with a 10% dead band.
    pub fn trend(&self) -> Trend {
        let recent = mean(self.records.iter().take(TREND_WINDOW));
        let older = mean(self.records.iter().skip(TREND_WINDOW).take(TREND_WINDOW));

        if recent > older * 1.1 {
            Trend::Up
        } else if recent < older * 0.9 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    /// Records strictly newer than `now - span`.
    pub fn window(&self, now: Timestamp, span_ms: u64) -> WindowTotals {
        let cutoff = now.saturating_sub(span_ms);
        self.records
            .iter()
            .filter(|r| r.timestamp > cutoff)
            .fold(WindowTotals::default(), |acc, r| WindowTotals {
                count: acc.count + 1,
                total: acc.total.saturating_add(r.gas_saved),
            })
    }

    pub fn daily(&self, now: Timestamp) -> WindowTotals {
        self.window(now, DAY_MS)
    }

    pub fn weekly(&self, now: Timestamp) -> WindowTotals {
        self.window(now, WEEK_MS)
    }

    /// Totals over records with status `Completed`.
    pub fn completed(&self) -> WindowTotals {
        self.records
            .iter()
            .filter(|r| r.status == RecordStatus::Completed)
            .fold(WindowTotals::default(), |acc, r| WindowTotals {
                count: acc.count + 1,
                total: acc.total.saturating_add(r.gas_saved),
            })
    }
}

fn mean<'a>(records: impl Iterator<Item = &'a TransactionRecord>) -> f64 {
    let (count, sum) = records.fold((0usize, 0f64), |(n, s), r| (n + 1, s + r.gas_saved as f64));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// A history record with display strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub record: TransactionRecord,
    pub formatted_time: String,
    pub formatted_gas_saved: String,
}

impl From<TransactionRecord> for HistoryEntry {
    fn from(record: TransactionRecord) -> Self {
        let formatted_time = chrono::DateTime::from_timestamp_millis(record.timestamp as i64)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();
        let formatted_gas_saved = format!("{} units", record.gas_saved);
        Self {
            record,
            formatted_time,
            formatted_gas_saved,
        }
    }
}
