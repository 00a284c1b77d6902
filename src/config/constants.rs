//! # Storage Compatibility Constants
//!
//! This module centralizes the constants that form the shard's compatibility
//! contract: the fixed slot size a tree leaf reserves per value, the blob
//! block size payloads spill into, and the chunking budget for a single scan
//! response. Constants that depend on each other are co-located so a change
//! to one is checked against the others.
//!
//! ## Dependency Graph
//!
//! ```text
//! MAX_BLOB_REFLEN (251 bytes)
//!       │
//!       ├─> INLINE_REF_HEADER / INDIRECT_REF_HEADER (encoded ref layouts
//!       │     must fit; enforced by compile-time assertions below)
//!       │
//!       └─> max indirect payload = block ids per ref * BLOB_BLOCK_SIZE
//!
//! SCAN_MAX_CHUNK_SIZE (1 MiB)
//!       │
//!       └─> DOCUMENT_SIZE_ESTIMATE (250 bytes)
//!             Coarse per-document charge; the chunk budget divided by the
//!             estimate bounds how many documents one response can carry.
//! ```
//!
//! ## Usage
//!
//! Runtime code receives these through [`StoreLimits`](super::StoreLimits),
//! injected at `TreeSlice` construction so tests can shrink the thresholds.
//! Import the constants directly only for defaults and layout math.

/// Maximum length of a store key, in bytes.
pub const MAX_KEY_SIZE: usize = 250;

/// Fixed size of the reference region inside a stored value slot. Every
/// encoded blob reference must fit in this many bytes regardless of the
/// payload length.
pub const MAX_BLOB_REFLEN: usize = 251;

/// Size of one indirect block. Payloads too large to inline are split into
/// blocks of this size and the slot stores their ids.
pub const BLOB_BLOCK_SIZE: usize = 4096;

/// Byte budget for one range-scan response chunk. A scan stops appending to
/// its stream once the cumulative estimated size reaches this limit.
pub const SCAN_MAX_CHUNK_SIZE: usize = 1 << 20;

/// Coarse per-document size estimate used when charging the chunk budget.
/// Intentionally not an exact byte count; it only bounds chunk size
/// heuristically.
pub const DOCUMENT_SIZE_ESTIMATE: usize = 250;

/// Encoded inline reference header: tag byte + u32 payload length.
pub const INLINE_REF_HEADER: usize = 5;

/// Encoded indirect reference header: tag byte + u64 total size + u16 block
/// count. Each referenced block adds a u64 id.
pub const INDIRECT_REF_HEADER: usize = 11;

const _: () = assert!(
    MAX_BLOB_REFLEN > INDIRECT_REF_HEADER + 8,
    "a slot must hold at least a one-block indirect reference"
);

const _: () = assert!(
    DOCUMENT_SIZE_ESTIMATE <= SCAN_MAX_CHUNK_SIZE,
    "a single document estimate must not exceed the whole chunk budget"
);
