//! Value storage: transaction-scoped indirect blocks, the blob indirection
//! codec, and the fixed-size value slots tree leaves hold.

pub mod blob;
mod slot;
mod txn;

pub use slot::ValueSlot;
pub use txn::{BlockId, Transaction};
