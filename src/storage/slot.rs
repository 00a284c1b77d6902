//! Stored value slots.
//!
//! A [`ValueSlot`] is the fixed-maximum-size record a tree leaf holds for a
//! key. It contains a blob reference to the document's serialized bytes, not
//! the bytes themselves; the reference always fits regardless of document
//! length (see [`blob`](super::blob)).

use super::blob::{Blob, BlobMut};

/// A fixed-size value record holding an encoded blob reference.
#[derive(Debug, Clone)]
pub struct ValueSlot {
    buf: Box<[u8]>,
}

impl ValueSlot {
    /// A fresh slot, zeroed (the empty blob), sized to the shard's fixed
    /// reference length.
    pub fn zeroed(max_reflen: usize) -> Self {
        Self {
            buf: vec![0u8; max_reflen].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn blob(&self) -> Blob<'_> {
        Blob::new(&self.buf)
    }

    pub fn blob_mut(&mut self, block_size: usize) -> BlobMut<'_> {
        BlobMut::new(&mut self.buf, block_size)
    }
}
