//! The ordered-tree collaborator surface: per-shard slices, location
//! handles, and the generic backfill and erase-range walks.

mod location;
mod slice;

pub use location::{ReadLocation, WriteLocation};
pub use slice::{AllKeys, BackfillCallback, KeyTester, TreeSlice, ValueDeleter};
