//! Configuration for the shard storage layer.
//!
//! [`StoreLimits`] bundles the size thresholds a [`TreeSlice`] operates
//! under. The limits are injected at slice construction rather than read from
//! globals so tests can exercise truncation and spill behavior with small
//! values.
//!
//! [`TreeSlice`]: crate::tree::TreeSlice

pub mod constants;

pub use constants::{
    BLOB_BLOCK_SIZE, DOCUMENT_SIZE_ESTIMATE, INDIRECT_REF_HEADER, INLINE_REF_HEADER,
    MAX_BLOB_REFLEN, MAX_KEY_SIZE, SCAN_MAX_CHUNK_SIZE,
};

/// Size thresholds governing one shard's storage and scan behavior.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StoreLimits {
    /// Fixed size of a slot's blob reference region.
    pub max_blob_reflen: usize,
    /// Size of one indirect block.
    pub blob_block_size: usize,
    /// Cumulative-size budget for one scan response chunk.
    pub scan_chunk_size: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_blob_reflen: MAX_BLOB_REFLEN,
            blob_block_size: BLOB_BLOCK_SIZE,
            scan_chunk_size: SCAN_MAX_CHUNK_SIZE,
        }
    }
}
