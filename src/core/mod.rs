//! Core ledger functionality
//!
//! This module contains the block-lattice primitives: the fixed-width byte
//! types, the five block variants with their hashes and byte layouts, and
//! the proof-of-work check and search.

pub mod block;
pub mod proof_of_work;
pub mod types;

pub use block::{Block, BlockBuilder, BlockContents, BlockType};
pub use proof_of_work::{
    ProofOfWork, WorkEncoding, WorkHandle, WorkThreshold, DEFAULT_WORK_THRESHOLD,
};
pub use types::{Balance, BlockHash, Link, Seed, Signature, SigningKey, VerifyingKey, Work};
