//! Replication timestamps.
//!
//! Every key modification carries a recency timestamp supplied by the caller;
//! backfill replays modifications at or after a requested timestamp.

/// A monotonically increasing replication timestamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplTimestamp(pub u64);

impl ReplTimestamp {
    /// Earlier than every real timestamp; backfilling since here replays
    /// everything.
    pub const DISTANT_PAST: ReplTimestamp = ReplTimestamp(0);
}

impl From<u64> for ReplTimestamp {
    fn from(raw: u64) -> Self {
        ReplTimestamp(raw)
    }
}
