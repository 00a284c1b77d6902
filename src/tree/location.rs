//! # Location Handles
//!
//! A location handle is a transient reference to "the slot for key K as
//! located in the tree right now", valid for the duration of one operation.
//!
//! [`ReadLocation`] is a plain borrow. [`WriteLocation`] takes exclusive
//! ownership of the key's current slot; callers move a newly built slot into
//! it ([`swap_value`]) or take the slot out ([`take_value`]), then mark the
//! key modification with [`apply_change`]. The handle commits the final state
//! back into the tree when it goes out of scope — including on early `?`
//! returns — so a fatal fault mid-operation never strands the entry outside
//! the tree.
//!
//! Invariant: taking the value out without applying a change discards it on
//! commit. The handle cannot resurrect a slot it no longer owns.
//!
//! [`swap_value`]: WriteLocation::swap_value
//! [`take_value`]: WriteLocation::take_value
//! [`apply_change`]: WriteLocation::apply_change

use super::slice::TreeSlice;
use crate::storage::ValueSlot;
use crate::types::{ReplTimestamp, StoreKey};

/// A read-only view of the slot for a key.
pub struct ReadLocation<'a> {
    slot: Option<&'a ValueSlot>,
}

impl<'a> ReadLocation<'a> {
    pub(crate) fn new(slot: Option<&'a ValueSlot>) -> Self {
        Self { slot }
    }

    pub fn value(&self) -> Option<&'a ValueSlot> {
        self.slot
    }

    pub fn has_value(&self) -> bool {
        self.slot.is_some()
    }
}

/// Exclusive ownership of the slot for a key, committed back on drop.
pub struct WriteLocation<'a> {
    slice: &'a mut TreeSlice,
    key: StoreKey,
    value: Option<ValueSlot>,
    recency: ReplTimestamp,
    had_value: bool,
    changed: bool,
}

impl<'a> WriteLocation<'a> {
    pub(crate) fn new(
        slice: &'a mut TreeSlice,
        key: StoreKey,
        current: Option<(ValueSlot, ReplTimestamp)>,
    ) -> Self {
        let (value, recency) = match current {
            Some((slot, recency)) => (Some(slot), recency),
            None => (None, ReplTimestamp::DISTANT_PAST),
        };
        let had_value = value.is_some();
        Self {
            slice,
            key,
            value,
            recency,
            had_value,
            changed: false,
        }
    }

    pub fn key(&self) -> &StoreKey {
        &self.key
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&ValueSlot> {
        self.value.as_ref()
    }

    pub fn value_mut(&mut self) -> Option<&mut ValueSlot> {
        self.value.as_mut()
    }

    /// Moves a newly built slot into the handle, returning the previous one.
    pub fn swap_value(&mut self, slot: ValueSlot) -> Option<ValueSlot> {
        self.value.replace(slot)
    }

    /// Takes the current slot out of the handle.
    pub fn take_value(&mut self) -> Option<ValueSlot> {
        self.value.take()
    }

    /// Marks the key as modified at `timestamp`. Commit records the change in
    /// the tree's key-modification bookkeeping: an owned slot is stored with
    /// this recency, an absent one becomes a logged deletion.
    pub fn apply_change(&mut self, timestamp: ReplTimestamp) {
        self.changed = true;
        self.recency = timestamp;
    }
}

impl Drop for WriteLocation<'_> {
    fn drop(&mut self) {
        let key = std::mem::take(&mut self.key);
        match self.value.take() {
            Some(slot) => self.slice.commit_entry(key, slot, self.recency),
            None => {
                if self.changed && self.had_value {
                    self.slice.record_deletion(key, self.recency);
                }
            }
        }
    }
}
