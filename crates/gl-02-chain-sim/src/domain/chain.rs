//! Chain head state.

use primitive_types::H256;
use shared_types::codec::{padded_hash, placeholder_hash};
use shared_types::{Block, BlockNumber, Digest};

/// The current head and nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainState {
    base: BlockNumber,
    head: Block,
}

impl ChainState {
    /// Starts at `base`.
    pub fn new(base: BlockNumber) -> Self {
        Self {
            base,
            head: build_block(base),
        }
    }

    pub fn base(&self) -> BlockNumber {
        self.base
    }

    pub fn head(&self) -> &Block {
        &self.head
    }

    pub fn number(&self) -> BlockNumber {
        self.head.number
    }

    /// Number the next `advance()` will produce.
    pub fn next_number(&self) -> BlockNumber {
        self.head.number.saturating_add(1)
    }

    /// Increments the counter by one and returns the new head.
    pub fn advance(&mut self) -> Block {
        self.head = build_block(self.next_number());
        self.head.clone()
    }
}

/// Deterministic hash of block `n`: `0x` + `n` left-padded to 64 hex digits.
pub fn block_hash(n: BlockNumber) -> H256 {
    padded_hash(n)
}

/// Header for block `n`, linked to `n - 1` by parent hash.
pub fn build_block(n: BlockNumber) -> Block {
    Block {
        number: n,
        parent_hash: block_hash(n.saturating_sub(1)),
        state_root: placeholder_hash("state", n),
        extrinsics_root: placeholder_hash("extrinsics", n),
        digest: Digest::default(),
    }
}
