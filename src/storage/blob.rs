//! # Blob Indirection
//!
//! A tree leaf reserves a fixed-size reference region per value; documents
//! can be arbitrarily large. This module encodes a *blob reference* into
//! that region: small payloads are stored inline, large ones are split into
//! fixed-size blocks held by the transaction and the region stores their ids.
//!
//! ## Reference Layouts
//!
//! ```text
//! Inline (payload fits alongside the header):
//! +--------+-------------+----------------+
//! | Marker | Length      | Payload        |
//! | 0x01   | u32 LE      | length bytes   |
//! +--------+-------------+----------------+
//!
//! Indirect (payload spilled into blocks):
//! +--------+-------------+---------+------------------+
//! | Marker | Total Size  | Blocks  | Block Ids        |
//! | 0xFE   | u64 LE      | u16 LE  | blocks * u64 LE  |
//! +--------+-------------+---------+------------------+
//! ```
//!
//! A zeroed region (marker `0x00`) is the empty blob. [`ref_fits`] reports
//! whether a payload of a given length is representable at all within the
//! fixed region size; it is the size-fit predicate writes check before
//! committing.

use eyre::{bail, ensure, Result};

use super::txn::{BlockId, Transaction};
use crate::config::{INDIRECT_REF_HEADER, INLINE_REF_HEADER};

pub const EMPTY_MARKER: u8 = 0x00;
pub const INLINE_MARKER: u8 = 0x01;
pub const INDIRECT_MARKER: u8 = 0xFE;

/// Encoded size of an inline reference for a payload of `data_len` bytes.
pub fn inline_ref_size(data_len: usize) -> usize {
    INLINE_REF_HEADER + data_len
}

/// Number of blocks a spilled payload of `data_len` bytes occupies.
pub fn block_count(block_size: usize, data_len: usize) -> usize {
    data_len.div_ceil(block_size)
}

/// Encoded size of an indirect reference for a payload of `data_len` bytes.
pub fn indirect_ref_size(block_size: usize, data_len: usize) -> usize {
    INDIRECT_REF_HEADER + 8 * block_count(block_size, data_len)
}

/// Whether a payload of `data_len` bytes can be represented by either
/// reference form within a region of `max_reflen` bytes.
pub fn ref_fits(max_reflen: usize, block_size: usize, data_len: usize) -> bool {
    inline_ref_size(data_len) <= max_reflen
        || indirect_ref_size(block_size, data_len) <= max_reflen
}

/// Read-only view over an encoded blob reference.
pub struct Blob<'a> {
    ref_bytes: &'a [u8],
}

impl<'a> Blob<'a> {
    pub fn new(ref_bytes: &'a [u8]) -> Self {
        Self { ref_bytes }
    }

    /// Materializes the full payload, resolving indirect blocks through the
    /// transaction. Any malformed reference is a fatal integrity fault.
    pub fn read_to_vec(&self, txn: &Transaction) -> Result<Vec<u8>> {
        ensure!(!self.ref_bytes.is_empty(), "blob reference region is empty");
        match self.ref_bytes[0] {
            EMPTY_MARKER => Ok(Vec::new()),
            INLINE_MARKER => {
                ensure!(
                    self.ref_bytes.len() >= INLINE_REF_HEADER,
                    "inline blob reference is truncated"
                );
                let len = u32::from_le_bytes(self.ref_bytes[1..5].try_into()?) as usize;
                ensure!(
                    self.ref_bytes.len() >= INLINE_REF_HEADER + len,
                    "inline blob payload of {len} bytes overruns the reference region"
                );
                Ok(self.ref_bytes[INLINE_REF_HEADER..INLINE_REF_HEADER + len].to_vec())
            }
            INDIRECT_MARKER => {
                let (total, ids) = self.decode_indirect()?;
                let mut out = Vec::with_capacity(total);
                for id in ids {
                    out.extend_from_slice(txn.read_block(id)?);
                }
                ensure!(
                    out.len() >= total,
                    "indirect blob blocks hold {} bytes, reference claims {total}",
                    out.len()
                );
                out.truncate(total);
                Ok(out)
            }
            other => bail!("invalid blob reference marker {other:#04x}"),
        }
    }

    fn decode_indirect(&self) -> Result<(usize, Vec<BlockId>)> {
        ensure!(
            self.ref_bytes.len() >= INDIRECT_REF_HEADER,
            "indirect blob reference is truncated"
        );
        let total = u64::from_le_bytes(self.ref_bytes[1..9].try_into()?) as usize;
        let blocks = u16::from_le_bytes(self.ref_bytes[9..11].try_into()?) as usize;
        let ids_end = INDIRECT_REF_HEADER + 8 * blocks;
        ensure!(
            self.ref_bytes.len() >= ids_end,
            "indirect blob reference lists {blocks} blocks but the region is too small"
        );
        let ids = self.ref_bytes[INDIRECT_REF_HEADER..ids_end]
            .chunks_exact(8)
            .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        Ok((total, ids))
    }
}

/// Mutable view over an encoded blob reference.
pub struct BlobMut<'a> {
    ref_bytes: &'a mut [u8],
    block_size: usize,
}

impl<'a> BlobMut<'a> {
    pub fn new(ref_bytes: &'a mut [u8], block_size: usize) -> Self {
        Self {
            ref_bytes,
            block_size,
        }
    }

    /// Encodes `data` into the reference region, spilling to indirect blocks
    /// when it does not fit inline. The caller must have checked
    /// [`ref_fits`]; an unrepresentable payload here is a broken invariant.
    pub fn write(&mut self, txn: &mut Transaction, data: &[u8]) -> Result<()> {
        self.ref_bytes.fill(0);
        if inline_ref_size(data.len()) <= self.ref_bytes.len() {
            self.ref_bytes[0] = INLINE_MARKER;
            self.ref_bytes[1..5].copy_from_slice(&(data.len() as u32).to_le_bytes());
            self.ref_bytes[INLINE_REF_HEADER..INLINE_REF_HEADER + data.len()]
                .copy_from_slice(data);
            return Ok(());
        }
        ensure!(
            indirect_ref_size(self.block_size, data.len()) <= self.ref_bytes.len(),
            "payload of {} bytes is not representable within a {} byte reference region",
            data.len(),
            self.ref_bytes.len()
        );
        let blocks = block_count(self.block_size, data.len());
        self.ref_bytes[0] = INDIRECT_MARKER;
        self.ref_bytes[1..9].copy_from_slice(&(data.len() as u64).to_le_bytes());
        self.ref_bytes[9..11].copy_from_slice(&(blocks as u16).to_le_bytes());
        for (i, chunk) in data.chunks(self.block_size).enumerate() {
            let id = txn.allocate_block(chunk);
            let at = INDIRECT_REF_HEADER + 8 * i;
            self.ref_bytes[at..at + 8].copy_from_slice(&id.to_le_bytes());
        }
        Ok(())
    }

    /// Releases any indirect blocks and zeroes the reference region.
    pub fn clear(&mut self, txn: &mut Transaction) -> Result<()> {
        if !self.ref_bytes.is_empty() && self.ref_bytes[0] == INDIRECT_MARKER {
            let (_, ids) = Blob::new(self.ref_bytes).decode_indirect()?;
            for id in ids {
                txn.release_block(id)?;
            }
        }
        self.ref_bytes.fill(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFLEN: usize = 64;
    const BLOCK: usize = 16;

    fn roundtrip(data: &[u8]) -> (Transaction, Vec<u8>) {
        let mut txn = Transaction::new();
        let mut region = vec![0u8; REFLEN];
        BlobMut::new(&mut region, BLOCK).write(&mut txn, data).unwrap();
        let out = Blob::new(&region).read_to_vec(&txn).unwrap();
        (txn, out)
    }

    #[test]
    fn inline_roundtrip_allocates_no_blocks() {
        let data = b"small payload";
        let (txn, out) = roundtrip(data);
        assert_eq!(out, data);
        assert_eq!(txn.live_blocks(), 0);
    }

    #[test]
    fn indirect_roundtrip_spills_to_blocks() {
        let data: Vec<u8> = (0..90u8).collect();
        let mut txn = Transaction::new();
        let mut region = vec![0u8; REFLEN];
        BlobMut::new(&mut region, BLOCK).write(&mut txn, &data).unwrap();
        assert_eq!(region[0], INDIRECT_MARKER);
        assert_eq!(txn.live_blocks(), block_count(BLOCK, data.len()));
        assert_eq!(Blob::new(&region).read_to_vec(&txn).unwrap(), data);
    }

    #[test]
    fn clear_releases_every_block() {
        let data = vec![7u8; 80];
        let mut txn = Transaction::new();
        let mut region = vec![0u8; REFLEN];
        BlobMut::new(&mut region, BLOCK).write(&mut txn, &data).unwrap();
        assert!(txn.live_blocks() > 0);
        BlobMut::new(&mut region, BLOCK).clear(&mut txn).unwrap();
        assert_eq!(txn.live_blocks(), 0);
        assert!(region.iter().all(|&b| b == 0));
    }

    #[test]
    fn zeroed_region_reads_as_empty() {
        let txn = Transaction::new();
        let region = vec![0u8; REFLEN];
        assert!(Blob::new(&region).read_to_vec(&txn).unwrap().is_empty());
    }

    #[test]
    fn ref_fits_bounds_representable_payloads() {
        assert!(ref_fits(REFLEN, BLOCK, 0));
        assert!(ref_fits(REFLEN, BLOCK, REFLEN - INLINE_REF_HEADER));
        // Max indirect: (64 - 11) / 8 = 6 ids -> 96 bytes of payload.
        assert!(ref_fits(REFLEN, BLOCK, 6 * BLOCK));
        assert!(!ref_fits(REFLEN, BLOCK, 7 * BLOCK));
    }

    #[test]
    fn invalid_marker_is_a_fault() {
        let txn = Transaction::new();
        let mut region = vec![0u8; REFLEN];
        region[0] = 0x42;
        assert!(Blob::new(&region).read_to_vec(&txn).is_err());
    }
}
