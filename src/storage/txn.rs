//! # Transaction-Scoped Block Storage
//!
//! Indirect blob blocks live in auxiliary storage reached through the
//! transaction an operation runs under. The transaction hands out opaque
//! block ids on allocation; readers resolve ids back to bytes, and deleting
//! a value releases its blocks.
//!
//! A missing block on read or release is corruption, not an expected
//! condition: the only path to a block id is a blob reference committed into
//! a slot, and the reference and its blocks are created and destroyed
//! together.

use eyre::{bail, Result};
use hashbrown::HashMap;

pub type BlockId = u64;

/// One operation's transactional context, owning the indirect block store.
#[derive(Debug, Default)]
pub struct Transaction {
    blocks: HashMap<BlockId, Box<[u8]>>,
    next_block: BlockId,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a block and returns its id. Ids are never reused within a
    /// transaction's lifetime.
    pub fn allocate_block(&mut self, data: &[u8]) -> BlockId {
        let id = self.next_block;
        self.next_block += 1;
        self.blocks.insert(id, data.into());
        id
    }

    pub fn read_block(&self, id: BlockId) -> Result<&[u8]> {
        match self.blocks.get(&id) {
            Some(block) => Ok(block),
            None => bail!("corruption detected: indirect block {id} is missing"),
        }
    }

    pub fn release_block(&mut self, id: BlockId) -> Result<()> {
        if self.blocks.remove(&id).is_none() {
            bail!("corruption detected: released indirect block {id} twice");
        }
        Ok(())
    }

    /// Number of live indirect blocks. Deleting every value must drive this
    /// back to zero.
    pub fn live_blocks(&self) -> usize {
        self.blocks.len()
    }
}
