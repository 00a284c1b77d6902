//! # Erase Range
//!
//! Bulk deletion over a key range. The caller supplies the range in
//! half-open `[left, right)` form; the tree's bulk-delete mechanism expects
//! exclusive-left / inclusive-right boundaries, so both bounds are shifted
//! to their lexicographic predecessors. Every deleted value's indirect
//! storage is released before its slot is removed.

use eyre::Result;
use tracing::debug;

use crate::storage::{Transaction, ValueSlot};
use crate::tree::{KeyTester, TreeSlice, ValueDeleter};
use crate::types::KeyRange;

struct BlobDeleter {
    block_size: usize,
}

impl ValueDeleter for BlobDeleter {
    fn delete_value(&self, txn: &mut Transaction, slot: &mut ValueSlot) -> Result<()> {
        slot.blob_mut(self.block_size).clear(txn)
    }
}

/// Deletes every key in `range` accepted by `tester`, releasing each value's
/// indirect storage.
pub fn erase_range(
    slice: &mut TreeSlice,
    txn: &mut Transaction,
    tester: &dyn KeyTester,
    range: &KeyRange,
) -> Result<()> {
    debug!(?range, "erase range");
    let deleter = BlobDeleter {
        block_size: slice.limits().blob_block_size,
    };

    // [left, right) -> (left_exclusive, right_inclusive]: both bounds step
    // back to their predecessor. A left bound with no predecessor (the
    // minimum key) becomes unbounded; a right bound with no predecessor
    // means the range is empty.
    let mut left_exclusive = range.left().clone();
    let left_supplied = left_exclusive.decrement();

    let right_inclusive = match range.right() {
        None => None,
        Some(right) => {
            let mut key = right.clone();
            if !key.decrement() {
                return Ok(());
            }
            Some(key)
        }
    };

    slice.erase_range_generic(
        tester,
        &deleter,
        left_supplied.then_some(&left_exclusive),
        right_inclusive.as_ref(),
        txn,
    )
}
