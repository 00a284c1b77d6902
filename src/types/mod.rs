//! Core value types shared across the shard: keys, key ranges, and
//! replication timestamps.

mod key;
mod timestamp;

pub use key::{KeyRange, StoreKey};
pub use timestamp::ReplTimestamp;
