//! # docshard — Per-Shard Document Storage
//!
//! docshard is the storage layer one shard of a distributed document
//! database runs on: it maps point and range document operations onto an
//! ordered key/value tree. Three concerns meet in one tight path:
//!
//! - **Variable-length documents in fixed-size slots**: a tree leaf reserves
//!   a fixed reference region per value; documents of any size are
//!   represented through a blob indirection that spills large payloads into
//!   transaction-held blocks.
//! - **Transactional read-modify-write**: point operations acquire a
//!   location handle for the key, read or rebuild the slot through the value
//!   codec, and commit on scope exit.
//! - **Chunked query execution during traversal**: range scans run a
//!   filter/map/concat-map/range-prune pipeline and an optional terminal
//!   reducer over each visited document, with cooperative early termination
//!   under count and size caps.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │   store: point ops │ range scan │ backfill    │
//! │                    │ erase range               │
//! ├────────────────────┼──────────────────────────┤
//! │  transform pipeline + terminal reducers       │
//! │  (document::expr evaluation)                  │
//! ├───────────────────────────────────────────────┤
//! │  value codec  (storage::blob indirection)     │
//! ├───────────────────────────────────────────────┤
//! │  tree: slices, location handles, traversal    │
//! ├───────────────────────────────────────────────┤
//! │  storage: transaction + indirect blocks       │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`store`]: the operation executors — the public surface
//! - [`tree`]: the ordered-tree collaborator surface (slices, handles)
//! - [`storage`]: transactions, blob indirection, value slots
//! - [`document`]: documents and the evaluated expression forms
//! - [`types`]: keys, key ranges, replication timestamps
//! - [`config`]: injected limits and compatibility constants
//!
//! ## Error Discipline
//!
//! Two classes only. Ordinary outcomes (key present or absent, value already
//! existed or not) are typed response variants. `Err` is reserved for fatal
//! integrity faults — corrupt stored bytes, broken engine invariants — which
//! abort the operation rather than being silently recovered.

pub mod config;
pub mod document;
pub mod storage;
pub mod store;
pub mod tree;
pub mod types;

pub use config::StoreLimits;
pub use document::Document;
pub use storage::Transaction;
pub use store::{
    backfill, erase_range, point_delete, point_get, point_set, range_scan, BackfillRecord,
    BackfillSink, PointDeleteOutcome, PointReadResponse, PointSetOutcome, RangeScanResponse,
    ScanEnv, ScanOutput, Terminal, Transform,
};
pub use tree::{AllKeys, TreeSlice};
pub use types::{KeyRange, ReplTimestamp, StoreKey};
