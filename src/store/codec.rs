//! # Value Codec
//!
//! Translates between documents and the byte sequence a value slot's blob
//! reference designates. Deserialization failure means the stored bytes are
//! corrupt — corruption is assumed, not expected, so decoding fails the
//! operation outright rather than surfacing a user-facing error.

use eyre::{Result, WrapErr};

use crate::config::StoreLimits;
use crate::document::Document;
use crate::storage::{blob, Transaction, ValueSlot};

/// Materializes and deserializes the document a slot refers to, resolving
/// indirect blocks through the transaction.
pub fn decode_value(slot: &ValueSlot, txn: &Transaction) -> Result<Document> {
    let bytes = slot.blob().read_to_vec(txn)?;
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .wrap_err("corruption detected: stored document failed to deserialize")?;
    Ok(Document::new(value))
}

/// Serializes a document for storage. Failure here is unreachable for any
/// well-formed document and is treated as fatal.
pub fn encode_document(document: &Document) -> Result<Vec<u8>> {
    serde_json::to_vec(document.value()).wrap_err("document serialization failed")
}

/// Whether a payload of `data_len` bytes can be represented by the
/// indirection scheme within the shard's fixed slot size. Checked
/// defensively before committing a write.
pub fn value_fits(limits: &StoreLimits, data_len: usize) -> bool {
    blob::ref_fits(limits.max_blob_reflen, limits.blob_block_size, data_len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_decode_roundtrip() {
        let limits = StoreLimits::default();
        let mut txn = Transaction::new();
        let doc = Document::new(json!({"id": 1, "tags": ["a", "b"]}));

        let bytes = encode_document(&doc).unwrap();
        assert!(value_fits(&limits, bytes.len()));

        let mut slot = ValueSlot::zeroed(limits.max_blob_reflen);
        slot.blob_mut(limits.blob_block_size)
            .write(&mut txn, &bytes)
            .unwrap();
        assert_eq!(decode_value(&slot, &txn).unwrap(), doc);
    }

    #[test]
    fn garbage_bytes_fail_fatally() {
        let limits = StoreLimits::default();
        let mut txn = Transaction::new();
        let mut slot = ValueSlot::zeroed(limits.max_blob_reflen);
        slot.blob_mut(limits.blob_block_size)
            .write(&mut txn, b"not json at all {{{")
            .unwrap();
        let err = decode_value(&slot, &txn).unwrap_err();
        assert!(err.to_string().contains("corruption"));
    }
}
