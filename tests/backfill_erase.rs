//! # Backfill and Erase-Range Test Suite
//!
//! Covers recency-filtered replay (including the trimmed-log degradation to
//! a full range copy), range scoping of backfill events, and bulk deletion
//! with boundary translation and indirect-storage release.

use docshard::{
    backfill, erase_range, point_delete, point_set, AllKeys, BackfillRecord, BackfillSink,
    Document, KeyRange, ReplTimestamp, StoreKey, StoreLimits, Transaction, TreeSlice,
};
use docshard::tree::KeyTester;
use eyre::Result;
use serde_json::json;

fn setup() -> (TreeSlice, Transaction) {
    (TreeSlice::new(StoreLimits::default()), Transaction::new())
}

fn key(s: &str) -> StoreKey {
    StoreKey::new(s).unwrap()
}

fn doc(v: serde_json::Value) -> Document {
    Document::new(v)
}

fn put(slice: &mut TreeSlice, txn: &mut Transaction, k: &str, v: serde_json::Value, ts: u64) {
    point_set(slice, txn, &key(k), &doc(v), ReplTimestamp(ts)).unwrap();
}

/// Records every backfill event in arrival order.
#[derive(Default)]
struct RecordingSink {
    delete_ranges: Vec<KeyRange>,
    deletions: Vec<(StoreKey, ReplTimestamp)>,
    records: Vec<BackfillRecord>,
}

impl BackfillSink for RecordingSink {
    fn on_delete_range(&mut self, range: &KeyRange) -> Result<()> {
        self.delete_ranges.push(range.clone());
        Ok(())
    }

    fn on_deletion(&mut self, key: &StoreKey, recency: ReplTimestamp) -> Result<()> {
        self.deletions.push((key.clone(), recency));
        Ok(())
    }

    fn on_record(&mut self, record: BackfillRecord) -> Result<()> {
        self.records.push(record);
        Ok(())
    }
}

// ============================================================================
// BACKFILL: RECENCY FILTERING
// ============================================================================

#[test]
fn backfill_replays_only_modifications_at_or_after_since() {
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "old", json!({"v": 1}), 2);
    put(&mut slice, &mut txn, "new", json!({"v": 2}), 5);
    put(&mut slice, &mut txn, "gone", json!({"v": 3}), 3);
    point_delete(&mut slice, &mut txn, &key("gone"), ReplTimestamp(6)).unwrap();

    let mut sink = RecordingSink::default();
    backfill(
        &slice,
        &txn,
        &KeyRange::universe(),
        ReplTimestamp(5),
        &mut sink,
    )
    .unwrap();

    assert!(sink.delete_ranges.is_empty());
    assert_eq!(sink.deletions, vec![(key("gone"), ReplTimestamp(6))]);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(
        sink.records[0],
        BackfillRecord {
            key: key("new"),
            recency: ReplTimestamp(5),
            document: doc(json!({"v": 2})),
        }
    );
}

#[test]
fn backfill_after_everything_replays_nothing() {
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "a", json!({"v": 1}), 1);

    let mut sink = RecordingSink::default();
    backfill(
        &slice,
        &txn,
        &KeyRange::universe(),
        ReplTimestamp(100),
        &mut sink,
    )
    .unwrap();

    assert!(sink.delete_ranges.is_empty());
    assert!(sink.deletions.is_empty());
    assert!(sink.records.is_empty());
}

#[test]
fn backfill_overwrite_surfaces_only_the_latest_version() {
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "k", json!({"v": 1}), 1);
    put(&mut slice, &mut txn, "k", json!({"v": 2}), 4);

    let mut sink = RecordingSink::default();
    backfill(
        &slice,
        &txn,
        &KeyRange::universe(),
        ReplTimestamp(2),
        &mut sink,
    )
    .unwrap();

    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].document, doc(json!({"v": 2})));
    assert_eq!(sink.records[0].recency, ReplTimestamp(4));
}

// ============================================================================
// BACKFILL: RANGE SCOPING
// ============================================================================

#[test]
fn backfill_is_scoped_to_the_requested_range() {
    let (mut slice, mut txn) = setup();
    for k in ["a", "b", "c"] {
        put(&mut slice, &mut txn, k, json!({"k": k}), 1);
    }
    point_delete(&mut slice, &mut txn, &key("b"), ReplTimestamp(2)).unwrap();

    // [c, ∞): neither a's pair nor b's deletion belongs here.
    let mut sink = RecordingSink::default();
    backfill(
        &slice,
        &txn,
        &KeyRange::new(key("c"), None),
        ReplTimestamp::DISTANT_PAST,
        &mut sink,
    )
    .unwrap();

    assert!(sink.deletions.is_empty());
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].key, key("c"));
}

// ============================================================================
// BACKFILL: TRIMMED DELETION LOG
// ============================================================================

#[test]
fn backfill_past_the_trim_horizon_degrades_to_a_full_copy() {
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "a", json!({"v": 1}), 1);
    point_delete(&mut slice, &mut txn, &key("a"), ReplTimestamp(2)).unwrap();
    put(&mut slice, &mut txn, "b", json!({"v": 2}), 3);

    slice.trim_deletion_log(ReplTimestamp(5));

    // The log no longer reaches back to 1: the sink must get a delete-range
    // notice and then every live pair, regardless of recency.
    let range = KeyRange::universe();
    let mut sink = RecordingSink::default();
    backfill(&slice, &txn, &range, ReplTimestamp(1), &mut sink).unwrap();

    assert_eq!(sink.delete_ranges, vec![range]);
    assert!(sink.deletions.is_empty());
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].key, key("b"));
}

#[test]
fn backfill_at_or_after_the_trim_horizon_replays_normally() {
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "a", json!({"v": 1}), 6);
    point_delete(&mut slice, &mut txn, &key("a"), ReplTimestamp(7)).unwrap();

    slice.trim_deletion_log(ReplTimestamp(5));

    let mut sink = RecordingSink::default();
    backfill(
        &slice,
        &txn,
        &KeyRange::universe(),
        ReplTimestamp(5),
        &mut sink,
    )
    .unwrap();

    assert!(sink.delete_ranges.is_empty());
    assert_eq!(sink.deletions, vec![(key("a"), ReplTimestamp(7))]);
}

// ============================================================================
// ERASE RANGE
// ============================================================================

#[test]
fn erase_deletes_the_half_open_range() {
    let (mut slice, mut txn) = setup();
    for k in ["a", "b", "c", "d"] {
        put(&mut slice, &mut txn, k, json!({"k": k}), 1);
    }

    erase_range(
        &mut slice,
        &mut txn,
        &AllKeys,
        &KeyRange::new(key("a"), Some(key("c"))),
    )
    .unwrap();

    assert!(!slice.contains_key(&key("a")));
    assert!(!slice.contains_key(&key("b")));
    assert!(slice.contains_key(&key("c")), "right bound is exclusive");
    assert!(slice.contains_key(&key("d")));
}

#[test]
fn erase_with_unbounded_right_clears_the_tail() {
    let (mut slice, mut txn) = setup();
    for k in ["a", "b", "c"] {
        put(&mut slice, &mut txn, k, json!({"k": k}), 1);
    }

    erase_range(
        &mut slice,
        &mut txn,
        &AllKeys,
        &KeyRange::new(key("b"), None),
    )
    .unwrap();

    assert!(slice.contains_key(&key("a")));
    assert!(!slice.contains_key(&key("b")));
    assert!(!slice.contains_key(&key("c")));
}

#[test]
fn erase_universe_empties_the_slice() {
    let (mut slice, mut txn) = setup();
    for k in ["", "a", "z"] {
        put(&mut slice, &mut txn, k, json!({"k": k}), 1);
    }

    erase_range(&mut slice, &mut txn, &AllKeys, &KeyRange::universe()).unwrap();
    assert!(slice.is_empty());
}

#[test]
fn erase_of_an_empty_range_is_a_no_op() {
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "a", json!({"v": 1}), 1);

    // [min, min) contains nothing.
    erase_range(
        &mut slice,
        &mut txn,
        &AllKeys,
        &KeyRange::new(StoreKey::min(), Some(StoreKey::min())),
    )
    .unwrap();
    assert_eq!(slice.len(), 1);
}

struct PrefixTester(&'static str);

impl KeyTester for PrefixTester {
    fn tests_key(&self, key: &StoreKey) -> bool {
        key.as_bytes().starts_with(self.0.as_bytes())
    }
}

#[test]
fn erase_honors_the_key_tester() {
    let (mut slice, mut txn) = setup();
    for k in ["app", "apple", "banana"] {
        put(&mut slice, &mut txn, k, json!({"k": k}), 1);
    }

    erase_range(
        &mut slice,
        &mut txn,
        &PrefixTester("app"),
        &KeyRange::universe(),
    )
    .unwrap();

    assert!(!slice.contains_key(&key("app")));
    assert!(!slice.contains_key(&key("apple")));
    assert!(slice.contains_key(&key("banana")));
}

#[test]
fn erase_releases_indirect_storage() {
    let (mut slice, mut txn) = setup();
    let big = doc(json!({"payload": "z".repeat(20_000)}));
    point_set(&mut slice, &mut txn, &key("big"), &big, ReplTimestamp(1)).unwrap();
    assert!(txn.live_blocks() > 0);

    erase_range(&mut slice, &mut txn, &AllKeys, &KeyRange::universe()).unwrap();
    assert!(slice.is_empty());
    assert_eq!(txn.live_blocks(), 0);
}

#[test]
fn erase_does_not_feed_the_backfill_deletion_log() {
    // Bulk erase is a resharding tool, not a replicated write: the removed
    // keys must not surface as deletions in a later backfill.
    let (mut slice, mut txn) = setup();
    put(&mut slice, &mut txn, "a", json!({"v": 1}), 1);
    erase_range(&mut slice, &mut txn, &AllKeys, &KeyRange::universe()).unwrap();

    let mut sink = RecordingSink::default();
    backfill(
        &slice,
        &txn,
        &KeyRange::universe(),
        ReplTimestamp::DISTANT_PAST,
        &mut sink,
    )
    .unwrap();
    assert!(sink.deletions.is_empty());
    assert!(sink.records.is_empty());
}
