//! # Tree Slice
//!
//! One shard's slice of the ordered key/value tree. The storage layer above
//! consumes exactly this surface:
//!
//! - location handles for point reads and writes ([`read_location`],
//!   [`write_location`])
//! - forward in-key-order traversal of a range ([`range_pairs`])
//! - a generic backfill walk driving a [`BackfillCallback`]
//! - a generic bulk erase driving a [`KeyTester`] and [`ValueDeleter`]
//!
//! Structural concerns of a production tree (node splitting, balancing,
//! eviction bookkeeping) are intentionally absent; the slice keeps the
//! ordered-entry semantics those algorithms preserve. Each entry carries the
//! recency timestamp of its last modification, and removed keys are recorded
//! in a deletion log so backfill can replay deletions. The log can be trimmed
//! ([`trim_deletion_log`]); a backfill asking for history older than the trim
//! horizon falls back to a delete-range notice followed by a full copy of the
//! range.
//!
//! ## Thread Safety
//!
//! A slice performs no internal synchronization. Each operation runs under a
//! `&`/`&mut` borrow pair (slice + transaction); isolation between concurrent
//! requests is the surrounding transaction layer's job.
//!
//! [`read_location`]: TreeSlice::read_location
//! [`write_location`]: TreeSlice::write_location
//! [`range_pairs`]: TreeSlice::range_pairs
//! [`trim_deletion_log`]: TreeSlice::trim_deletion_log

use eyre::Result;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::debug;

use super::location::{ReadLocation, WriteLocation};
use crate::config::StoreLimits;
use crate::storage::{Transaction, ValueSlot};
use crate::types::{KeyRange, ReplTimestamp, StoreKey};

/// One stored entry: the value slot plus the recency of its last change.
#[derive(Debug)]
pub(crate) struct SlotEntry {
    pub(crate) slot: ValueSlot,
    pub(crate) recency: ReplTimestamp,
}

/// Consumer of the generic backfill walk.
pub trait BackfillCallback {
    fn on_delete_range(&mut self, range: &KeyRange) -> Result<()>;
    fn on_deletion(&mut self, key: &StoreKey, recency: ReplTimestamp) -> Result<()>;
    fn on_pair(
        &mut self,
        txn: &Transaction,
        recency: ReplTimestamp,
        key: &StoreKey,
        slot: &ValueSlot,
    ) -> Result<()>;
}

/// Filters which keys a bulk erase touches.
pub trait KeyTester {
    fn tests_key(&self, key: &StoreKey) -> bool;
}

/// A tester accepting every key.
pub struct AllKeys;

impl KeyTester for AllKeys {
    fn tests_key(&self, _key: &StoreKey) -> bool {
        true
    }
}

/// Releases a value's auxiliary storage before its slot is removed.
pub trait ValueDeleter {
    fn delete_value(&self, txn: &mut Transaction, slot: &mut ValueSlot) -> Result<()>;
}

/// One shard's slice of the ordered tree.
#[derive(Debug)]
pub struct TreeSlice {
    limits: StoreLimits,
    entries: BTreeMap<StoreKey, SlotEntry>,
    deletions: Vec<(StoreKey, ReplTimestamp)>,
    deletion_horizon: ReplTimestamp,
}

impl TreeSlice {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            limits,
            entries: BTreeMap::new(),
            deletions: Vec::new(),
            deletion_horizon: ReplTimestamp::DISTANT_PAST,
        }
    }

    pub fn limits(&self) -> &StoreLimits {
        &self.limits
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &StoreKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Locates the slot for `key` for reading. The handle is valid for the
    /// duration of one operation.
    pub fn read_location(&self, key: &StoreKey) -> ReadLocation<'_> {
        ReadLocation::new(self.entries.get(key).map(|entry| &entry.slot))
    }

    /// Locates the slot for `key` for writing. The handle takes exclusive
    /// ownership of the current slot (if any) and commits the final state
    /// back on scope exit, on every exit path.
    pub fn write_location(&mut self, key: StoreKey) -> WriteLocation<'_> {
        let current = self
            .entries
            .remove(&key)
            .map(|entry| (entry.slot, entry.recency));
        WriteLocation::new(self, key, current)
    }

    /// Forward, in-key-order iteration over the entries of a range.
    pub fn range_pairs<'a>(
        &'a self,
        range: &'a KeyRange,
    ) -> impl Iterator<Item = (&'a StoreKey, &'a ValueSlot)> + 'a {
        let lower = Bound::Included(range.left());
        let upper = match range.right() {
            Some(right) => Bound::Excluded(right),
            None => Bound::Unbounded,
        };
        self.entries
            .range::<StoreKey, _>((lower, upper))
            .map(|(key, entry)| (key, &entry.slot))
    }

    /// Replays modifications within `range` at or after `since` to the
    /// callback. If the deletion log no longer reaches back to `since`, the
    /// callback first receives a delete-range notice and then a full copy of
    /// the range.
    pub fn backfill(
        &self,
        range: &KeyRange,
        since: ReplTimestamp,
        callback: &mut dyn BackfillCallback,
        txn: &Transaction,
    ) -> Result<()> {
        let replay_all = since < self.deletion_horizon;
        if replay_all {
            debug!(?range, "deletion log trimmed past requested timestamp, replaying full range");
            callback.on_delete_range(range)?;
        } else {
            for (key, recency) in &self.deletions {
                if *recency >= since && range.contains_key(key) {
                    callback.on_deletion(key, *recency)?;
                }
            }
        }
        for (key, entry) in self.entry_range(range) {
            if replay_all || entry.recency >= since {
                callback.on_pair(txn, entry.recency, key, &entry.slot)?;
            }
        }
        Ok(())
    }

    /// Drops deletion records older than `up_to`. Backfills asking for
    /// history before this horizon degrade to a full range copy.
    pub fn trim_deletion_log(&mut self, up_to: ReplTimestamp) {
        if up_to <= self.deletion_horizon {
            return;
        }
        self.deletions.retain(|(_, recency)| *recency >= up_to);
        self.deletion_horizon = up_to;
    }

    /// Deletes every entry with `left_exclusive < key <= right_inclusive`
    /// (either bound optional) accepted by the tester, releasing each value's
    /// auxiliary storage through the deleter first.
    pub fn erase_range_generic(
        &mut self,
        tester: &dyn KeyTester,
        deleter: &dyn ValueDeleter,
        left_exclusive: Option<&StoreKey>,
        right_inclusive: Option<&StoreKey>,
        txn: &mut Transaction,
    ) -> Result<()> {
        let lower = match left_exclusive {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let upper = match right_inclusive {
            Some(key) => Bound::Included(key),
            None => Bound::Unbounded,
        };
        let victims: Vec<StoreKey> = self
            .entries
            .range::<StoreKey, _>((lower, upper))
            .map(|(key, _)| key.clone())
            .filter(|key| tester.tests_key(key))
            .collect();
        debug!(count = victims.len(), "erasing key range");
        for key in victims {
            // Presence is guaranteed: the keys were collected above and the
            // deleter cannot touch the entry map.
            if let Some(mut entry) = self.entries.remove(&key) {
                deleter.delete_value(txn, &mut entry.slot)?;
            }
        }
        Ok(())
    }

    fn entry_range<'a>(
        &'a self,
        range: &'a KeyRange,
    ) -> impl Iterator<Item = (&'a StoreKey, &'a SlotEntry)> + 'a {
        let lower = Bound::Included(range.left());
        let upper = match range.right() {
            Some(right) => Bound::Excluded(right),
            None => Bound::Unbounded,
        };
        self.entries.range::<StoreKey, _>((lower, upper))
    }

    pub(crate) fn commit_entry(&mut self, key: StoreKey, slot: ValueSlot, recency: ReplTimestamp) {
        self.entries.insert(key, SlotEntry { slot, recency });
    }

    pub(crate) fn record_deletion(&mut self, key: StoreKey, recency: ReplTimestamp) {
        self.deletions.push((key, recency));
    }
}
