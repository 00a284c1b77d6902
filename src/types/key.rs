//! # Store Keys and Key Ranges
//!
//! Keys are opaque byte strings, at most [`MAX_KEY_SIZE`] bytes long, ordered
//! lexicographically. A [`KeyRange`] is half-open: it contains every key `k`
//! with `left <= k < right`, and an absent right bound means unbounded.
//!
//! The bulk-delete mechanism works on an exclusive-left / inclusive-right
//! boundary representation instead, so [`StoreKey::decrement`] computes the
//! lexicographic predecessor of a key: the greatest key (within the length
//! bound) that sorts strictly before it.

use eyre::{ensure, Result};
use smallvec::SmallVec;
use std::fmt;

use crate::config::MAX_KEY_SIZE;

/// An opaque byte-string key, ordered lexicographically.
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreKey(SmallVec<[u8; 24]>);

impl StoreKey {
    /// Builds a key from raw bytes, rejecting oversized keys.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        ensure!(
            bytes.len() <= MAX_KEY_SIZE,
            "key of {} bytes exceeds the {} byte limit",
            bytes.len(),
            MAX_KEY_SIZE
        );
        Ok(Self(SmallVec::from_slice(bytes)))
    }

    /// The smallest possible key (the empty byte string).
    pub fn min() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replaces this key with its lexicographic predecessor.
    ///
    /// Returns `false` when no predecessor exists (the empty key). A key
    /// ending in a zero byte simply drops it; otherwise the last byte is
    /// decremented and the key is padded with `0xff` up to the length bound,
    /// since every extension of the decremented prefix still sorts before the
    /// original key.
    pub fn decrement(&mut self) -> bool {
        match self.0.last().copied() {
            None => false,
            Some(0) => {
                self.0.pop();
                true
            }
            Some(last) => {
                let end = self.0.len() - 1;
                self.0[end] = last - 1;
                while self.0.len() < MAX_KEY_SIZE {
                    self.0.push(0xff);
                }
                true
            }
        }
    }

    /// The smallest key sorting strictly after this one.
    ///
    /// Used to express a closed upper bound as an exclusive one; the result
    /// may exceed the storable length bound but is only ever used as a range
    /// boundary.
    pub fn lexicographic_successor(&self) -> Self {
        let mut bytes = self.0.clone();
        bytes.push(0);
        Self(bytes)
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({:?})", String::from_utf8_lossy(&self.0))
    }
}

/// A half-open range of store keys: `[left, right)`, unbounded on the right
/// when `right` is `None`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyRange {
    left: StoreKey,
    right: Option<StoreKey>,
}

impl KeyRange {
    pub fn new(left: StoreKey, right: Option<StoreKey>) -> Self {
        Self { left, right }
    }

    /// The range containing every key.
    pub fn universe() -> Self {
        Self {
            left: StoreKey::min(),
            right: None,
        }
    }

    /// A range closed on both ends, `[lower, upper]`, with either bound
    /// optional.
    pub fn closed(lower: Option<StoreKey>, upper: Option<StoreKey>) -> Self {
        Self {
            left: lower.unwrap_or_else(StoreKey::min),
            right: upper.map(|u| u.lexicographic_successor()),
        }
    }

    pub fn left(&self) -> &StoreKey {
        &self.left
    }

    pub fn right(&self) -> Option<&StoreKey> {
        self.right.as_ref()
    }

    pub fn contains_key(&self, key: &StoreKey) -> bool {
        *key >= self.left && self.right.as_ref().map_or(true, |r| key < r)
    }

    pub fn is_superset(&self, other: &KeyRange) -> bool {
        let right_covered = match (&self.right, &other.right) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(ours), Some(theirs)) => theirs <= ours,
        };
        self.left <= other.left && right_covered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> StoreKey {
        StoreKey::new(s).unwrap()
    }

    #[test]
    fn ordering_is_lexicographic() {
        assert!(key("a") < key("b"));
        assert!(key("a") < key("aa"));
        assert!(StoreKey::min() < key("\0"));
    }

    #[test]
    fn oversized_key_rejected() {
        assert!(StoreKey::new(vec![0u8; MAX_KEY_SIZE]).is_ok());
        assert!(StoreKey::new(vec![0u8; MAX_KEY_SIZE + 1]).is_err());
    }

    #[test]
    fn decrement_empty_key_fails() {
        let mut k = StoreKey::min();
        assert!(!k.decrement());
    }

    #[test]
    fn decrement_trailing_zero_drops_it() {
        let mut k = key("a\0");
        assert!(k.decrement());
        assert_eq!(k, key("a"));
    }

    #[test]
    fn decrement_is_greatest_key_below() {
        let mut k = key("b");
        assert!(k.decrement());
        assert!(k < key("b"));
        // No storable key fits between the predecessor and the original.
        assert!(k > key("a"));
        assert!(k.as_bytes().ends_with(&[0xff]));
        assert_eq!(k.len(), MAX_KEY_SIZE);
    }

    #[test]
    fn successor_sorts_immediately_after() {
        let k = key("abc");
        let succ = k.lexicographic_successor();
        assert!(succ > k);
        assert!(succ < key("abd"));
    }

    #[test]
    fn range_contains_half_open() {
        let range = KeyRange::new(key("b"), Some(key("d")));
        assert!(!range.contains_key(&key("a")));
        assert!(range.contains_key(&key("b")));
        assert!(range.contains_key(&key("c")));
        assert!(!range.contains_key(&key("d")));
    }

    #[test]
    fn unbounded_range_contains_everything_past_left() {
        let range = KeyRange::new(key("b"), None);
        assert!(range.contains_key(&key("zzzz")));
        assert!(!range.contains_key(&key("a")));
    }

    #[test]
    fn closed_range_includes_upper_bound() {
        let range = KeyRange::closed(Some(key("b")), Some(key("d")));
        assert!(range.contains_key(&key("d")));
        assert!(!range.contains_key(&key("d\0")));
    }

    #[test]
    fn superset_checks_both_bounds() {
        let outer = KeyRange::new(key("a"), Some(key("z")));
        let inner = KeyRange::new(key("b"), Some(key("y")));
        assert!(outer.is_superset(&inner));
        assert!(!inner.is_superset(&outer));
        assert!(KeyRange::universe().is_superset(&outer));
        assert!(!outer.is_superset(&KeyRange::universe()));
    }
}
