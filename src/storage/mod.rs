//! Data storage and persistence
//!
//! Blocks are kept in their storage form (packed block plus the hash of the
//! next block) in one named table per block type, keyed by block hash. The
//! auxiliary tables exist so every store exposes the same set of names.

pub mod block_store;
pub mod sled_store;

pub use block_store::{BlockStore, MemoryStore, Table};
pub use sled_store::SledStore;
