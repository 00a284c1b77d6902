//! # Shard Document Store
//!
//! The per-shard storage layer: maps point and range document operations
//! onto the ordered key/value tree.
//!
//! - [`point`] — get / set / delete for a single key
//! - [`scan`] — chunked range scans with a transform pipeline and optional
//!   terminal reducer
//! - [`backfill`] — recency-filtered, range-guarded replay of stored
//!   documents
//! - [`erase`] — bulk deletion with boundary translation and indirect
//!   storage release
//! - [`codec`] — document (de)serialization through the blob indirection
//!
//! Error discipline: typed outcome variants for ordinary results, `Err` only
//! for fatal integrity faults (corrupt values, broken engine invariants).

pub mod backfill;
pub mod codec;
pub mod env;
pub mod erase;
pub mod point;
pub mod response;
pub mod scan;
pub mod terminal;
pub mod transform;

pub use backfill::{backfill, BackfillRecord, BackfillSink};
pub use codec::{decode_value, encode_document, value_fits};
pub use env::{ScanEnv, WriteOp, WriteSink};
pub use erase::erase_range;
pub use point::{point_delete, point_get, point_set};
pub use response::{
    Groups, PointDeleteOutcome, PointReadResponse, PointSetOutcome, RangeScanResponse, ScanOutput,
};
pub use scan::{estimate_response_size, range_scan};
pub use terminal::Terminal;
pub use transform::Transform;
