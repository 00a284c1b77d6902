//! # Backfill Adapter
//!
//! Wraps the tree's generic backfill walk for document replication: every
//! callback is guarded by a key-range containment check before forwarding,
//! and stored pairs are decoded into [`BackfillRecord`]s. A key or range
//! escaping the shard's configured range means the walk itself is broken —
//! a fatal fault, not a skippable record.

use eyre::{ensure, Result};
use tracing::debug;

use super::codec::decode_value;
use crate::document::Document;
use crate::storage::{Transaction, ValueSlot};
use crate::tree::{BackfillCallback, TreeSlice};
use crate::types::{KeyRange, ReplTimestamp, StoreKey};

/// One replayed key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillRecord {
    pub key: StoreKey,
    pub recency: ReplTimestamp,
    pub document: Document,
}

/// The recency-aware consumer a backfill streams into.
pub trait BackfillSink {
    fn on_delete_range(&mut self, range: &KeyRange) -> Result<()>;
    fn on_deletion(&mut self, key: &StoreKey, recency: ReplTimestamp) -> Result<()>;
    fn on_record(&mut self, record: BackfillRecord) -> Result<()>;
}

struct GuardedCallback<'a> {
    sink: &'a mut dyn BackfillSink,
    range: KeyRange,
}

impl BackfillCallback for GuardedCallback<'_> {
    fn on_delete_range(&mut self, range: &KeyRange) -> Result<()> {
        ensure!(
            self.range.is_superset(range),
            "backfill delete-range {range:?} escapes the shard range {:?}",
            self.range
        );
        self.sink.on_delete_range(range)
    }

    fn on_deletion(&mut self, key: &StoreKey, recency: ReplTimestamp) -> Result<()> {
        ensure!(
            self.range.contains_key(key),
            "backfill deletion for {key:?} escapes the shard range {:?}",
            self.range
        );
        self.sink.on_deletion(key, recency)
    }

    fn on_pair(
        &mut self,
        txn: &Transaction,
        recency: ReplTimestamp,
        key: &StoreKey,
        slot: &ValueSlot,
    ) -> Result<()> {
        ensure!(
            self.range.contains_key(key),
            "backfill pair for {key:?} escapes the shard range {:?}",
            self.range
        );
        let document = decode_value(slot, txn)?;
        self.sink.on_record(BackfillRecord {
            key: key.clone(),
            recency,
            document,
        })
    }
}

/// Replays every modification within `range` made at or after `since` into
/// the sink, scoped strictly to the given range.
pub fn backfill(
    slice: &TreeSlice,
    txn: &Transaction,
    range: &KeyRange,
    since: ReplTimestamp,
    sink: &mut dyn BackfillSink,
) -> Result<()> {
    debug!(?range, ?since, "backfill starting");
    let mut guarded = GuardedCallback {
        sink,
        range: range.clone(),
    };
    slice.backfill(range, since, &mut guarded, txn)
}
