//! # Point Operations
//!
//! Get, set, and delete for a single key. Each acquires a location handle
//! from the tree, reads or writes through the value codec, and releases the
//! handle on every exit path (the write handle commits on scope exit).
//!
//! Presence and absence are ordinary outcomes, returned as typed variants.
//! Overwrite is unconditional; there is no compare-and-swap.

use eyre::{ensure, Result};
use tracing::trace;

use super::codec::{decode_value, encode_document, value_fits};
use super::response::{PointDeleteOutcome, PointReadResponse, PointSetOutcome};
use crate::document::Document;
use crate::storage::{Transaction, ValueSlot};
use crate::tree::TreeSlice;
use crate::types::{ReplTimestamp, StoreKey};

/// Reads the document stored at `key`, if any. No mutation, no side effects.
pub fn point_get(
    slice: &TreeSlice,
    txn: &Transaction,
    key: &StoreKey,
) -> Result<PointReadResponse> {
    let location = slice.read_location(key);
    let document = match location.value() {
        None => None,
        Some(slot) => Some(decode_value(slot, txn)?),
    };
    trace!(?key, found = document.is_some(), "point get");
    Ok(PointReadResponse { document })
}

/// Stores `document` at `key`, overwriting any prior value and releasing its
/// indirect storage. Returns whether a prior value existed.
pub fn point_set(
    slice: &mut TreeSlice,
    txn: &mut Transaction,
    key: &StoreKey,
    document: &Document,
    timestamp: ReplTimestamp,
) -> Result<PointSetOutcome> {
    let limits = slice.limits().clone();
    let encoded = encode_document(document)?;
    ensure!(
        value_fits(&limits, encoded.len()),
        "encoded document of {} bytes is not representable within a {}-byte slot",
        encoded.len(),
        limits.max_blob_reflen
    );

    let mut slot = ValueSlot::zeroed(limits.max_blob_reflen);
    slot.blob_mut(limits.blob_block_size).write(txn, &encoded)?;

    let mut location = slice.write_location(key.clone());
    let already_existed = location.has_value();
    if let Some(old) = location.value_mut() {
        old.blob_mut(limits.blob_block_size).clear(txn)?;
    }
    location.swap_value(slot);
    // The key is modified, not expired.
    location.apply_change(timestamp);

    trace!(?key, already_existed, "point set");
    Ok(if already_existed {
        PointSetOutcome::Duplicate
    } else {
        PointSetOutcome::Stored
    })
}

/// Deletes the value at `key`, releasing its indirect storage. Returns
/// whether a value existed.
pub fn point_delete(
    slice: &mut TreeSlice,
    txn: &mut Transaction,
    key: &StoreKey,
    timestamp: ReplTimestamp,
) -> Result<PointDeleteOutcome> {
    let block_size = slice.limits().blob_block_size;
    let mut location = slice.write_location(key.clone());
    if !location.has_value() {
        return Ok(PointDeleteOutcome::Missing);
    }
    if let Some(slot) = location.value_mut() {
        slot.blob_mut(block_size).clear(txn)?;
    }
    location.take_value();
    location.apply_change(timestamp);
    trace!(?key, "point delete");
    Ok(PointDeleteOutcome::Deleted)
}
