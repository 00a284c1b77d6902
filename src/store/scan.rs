//! # Range Scan Engine
//!
//! Drives one forward, in-key-order traversal of a key range, feeding each
//! stored document through the transform pipeline and either streaming the
//! survivors back or folding them into a terminal reducer.
//!
//! ## Per-pair algorithm
//!
//! ```text
//! for (key, slot) in tree range, ascending:
//!   1. advance the resumption cursor to key (monotone, never regresses)
//!   2. decode slot -> working list of one document
//!   3. run each transform step over the whole working list, in order
//!   4a. no terminal: append survivors to the stream, charge the chunk
//!       budget per document; stop once the stream reaches the count cap
//!       or the budget is spent
//!   4b. terminal: fold each survivor into the result; never stop early —
//!       a terminal must see the whole range
//! ```
//!
//! A stream is marked `truncated` only when the size budget was the reason
//! it stopped; hitting the count cap alone is not truncation. The cursor
//! advances even for pairs whose documents the pipeline dropped, so a
//! continuation scan starting past `last_considered_key` never revisits
//! them. The engine itself is not resumable; continuation is client-driven.
//!
//! Per-document size estimation is a coarse constant, acceptable because it
//! only bounds chunk size heuristically.

use eyre::{bail, Result};
use tracing::debug;

use super::codec::decode_value;
use super::env::ScanEnv;
use super::response::{RangeScanResponse, ScanOutput};
use super::terminal::{apply_terminal, initial_output, Terminal};
use super::transform::{apply_transform, Transform};
use crate::config::DOCUMENT_SIZE_ESTIMATE;
use crate::document::Document;
use crate::storage::Transaction;
use crate::tree::TreeSlice;
use crate::types::{KeyRange, StoreKey};

/// Coarse estimate of a document's encoded response size.
pub fn estimate_response_size(_document: &Document) -> usize {
    DOCUMENT_SIZE_ESTIMATE
}

/// Scans `range` in key order, applying `transforms` to every stored
/// document and accumulating into the shape `terminal` implies (a stream
/// when absent). `maximum` caps the stream's document count.
pub fn range_scan(
    slice: &TreeSlice,
    txn: &Transaction,
    range: &KeyRange,
    maximum: usize,
    env: &mut ScanEnv<'_>,
    transforms: &[Transform],
    terminal: Option<&Terminal>,
) -> Result<RangeScanResponse> {
    let chunk_limit = slice.limits().scan_chunk_size;
    let mut result = initial_output(terminal);
    let mut cumulative_size = 0usize;
    let mut last_considered_key = StoreKey::min();

    for (key, slot) in slice.range_pairs(range) {
        if last_considered_key < *key {
            last_considered_key = key.clone();
        }

        let mut data = vec![decode_value(slot, txn)?];
        for step in transforms {
            let mut next = Vec::new();
            for doc in &data {
                apply_transform(step, &mut env.scope, doc, &mut next)?;
            }
            data = next;
        }

        match terminal {
            None => {
                let ScanOutput::Stream(stream) = &mut result else {
                    bail!("scan accumulator is not a stream");
                };
                for doc in data {
                    cumulative_size += estimate_response_size(&doc);
                    stream.push(doc);
                }
                if stream.len() >= maximum || cumulative_size >= chunk_limit {
                    break;
                }
            }
            Some(terminal) => {
                for doc in &data {
                    apply_terminal(terminal, env, doc, &mut result)?;
                }
            }
        }
    }

    let truncated = cumulative_size >= chunk_limit;
    debug!(
        ?last_considered_key,
        truncated, cumulative_size, "range scan finished"
    );
    Ok(RangeScanResponse {
        result,
        truncated,
        last_considered_key,
    })
}
