//! Outbound ports (driven side)

use parking_lot::Mutex;
use shared_types::Block;

use crate::domain::ChainState;

/// Port: advance the shared chain head by one block.
///
/// Implementations deliver the new head to whoever needs it before
/// returning, so that deliveries stay in block order.
pub trait ChainHead: Send + Sync {
    fn advance_head(&self) -> Block;
}

impl ChainHead for Mutex<ChainState> {
    fn advance_head(&self) -> Block {
        self.lock().advance()
    }
}
