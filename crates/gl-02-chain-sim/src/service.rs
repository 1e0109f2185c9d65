//! Block producer loop.

use std::sync::Arc;
use std::time::Duration;

use gl_telemetry::BLOCKS_PRODUCED;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::ports::ChainHead;

/// Advances the chain head once per period. The head owner keeps the
/// `CHAIN_HEAD` gauge current.
pub struct BlockProducer {
    period: Duration,
    head: Arc<dyn ChainHead>,
}

impl BlockProducer {
    pub fn new(period: Duration, head: Arc<dyn ChainHead>) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            head,
        }
    }

    /// Starts the loop on the current runtime.
    pub fn spawn(self) -> ProducerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        ProducerHandle {
            shutdown: shutdown_tx,
            task,
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        // First block one full period after start.
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = self.period.as_millis() as u64, "Block producer started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let block = self.head.advance_head();
                    BLOCKS_PRODUCED.inc();
                    debug!(number = block.number, "New head produced");
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Block producer stopped");
    }
}

/// Handle to a running producer.
pub struct ProducerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ProducerHandle {
    /// Signals the loop to stop and waits for it.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
