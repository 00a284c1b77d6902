//! Typed operation responses.
//!
//! Ordinary outcomes — key present or absent, value already existed or not —
//! are response variants, never errors. The error channel is reserved for
//! fatal integrity faults.

use std::collections::BTreeMap;

use crate::document::Document;
use crate::types::StoreKey;

/// Response to a point get.
#[derive(Debug, Clone, PartialEq)]
pub struct PointReadResponse {
    pub document: Option<Document>,
}

impl PointReadResponse {
    pub fn found(&self) -> bool {
        self.document.is_some()
    }
}

/// Outcome of a point set. Overwrite is unconditional; both variants are
/// success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointSetOutcome {
    /// No prior value existed for the key.
    Stored,
    /// A prior value existed and was overwritten.
    Duplicate,
}

/// Outcome of a point delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointDeleteOutcome {
    Deleted,
    Missing,
}

/// Grouped-reduce accumulators, keyed by the grouping document's canonical
/// serialization. Ordered for deterministic iteration.
pub type Groups = BTreeMap<String, Document>;

/// The accumulated result of a range scan. The active variant is fixed
/// before any document is processed, by the terminal (or its absence).
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutput {
    Stream(Vec<Document>),
    Groups(Groups),
    Atom(Document),
    Length(u64),
    Inserted,
}

/// A range scan's response: the accumulated result, whether the stream was
/// cut short by the chunk-size budget, and the resumption cursor. A client
/// continues by issuing a new scan starting just past `last_considered_key`.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeScanResponse {
    pub result: ScanOutput,
    pub truncated: bool,
    pub last_considered_key: StoreKey,
}
