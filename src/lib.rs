//! # Lattice Ledger - My Block-Lattice Node Primitives
//!
//! This is my Rust implementation of the core pieces of a block-lattice
//! cryptocurrency node: one chain per account, each block signed by its
//! account and carrying a small proof of work.
//!
//! ## What I Built
//! - **Accounts**: seed + index key derivation, Ed25519 signatures hashed
//!   with Blake2b, and checksummed `xrb_` addresses
//! - **Blocks**: open, send, receive, change and state blocks with their
//!   exact hashes and network/storage byte layouts
//! - **Proof of Work**: the Blake2b threshold check and a cancellable
//!   nonce search on its own thread
//! - **Network**: header framing, keepalive peer payloads and a UDP node
//!   with receive and keepalive workers
//! - **Storage**: named tables in Sled, keyed by block hash
//!
//! ## How I Organized My Code
//! - `core/`: byte types, blocks, proof of work
//! - `account/`: key derivation, addresses, signing
//! - `network/`: message framing, peers, transport, the node loop
//! - `storage/`: the block store trait, Sled and in-memory stores
//! - `config/`: settings from TOML and the environment
//! - `utils/`: hex and base32 codecs, Blake2b and Ed25519 helpers
//! - `cli/`: command-line definitions and the message decoder
//!
//! ## Things I Need to Remember
//! - A block hash never covers the signature, the work or `next`
//! - Legacy blocks serialize work little-endian, state blocks big-endian
//! - Keepalive ports are little-endian on the wire
//! - Signature and work checks return `bool`; malformed bytes are errors

pub mod account;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use account::{
    address_to_verifying_key, address_valid, seed_to_signing_key, signing_to_verifying_key,
    verifying_key_to_address, Account, ADDRESS_PREFIX,
};
pub use cli::{summarize, Command, Opt};
pub use config::{Config, Settings, GLOBAL_CONFIG};
pub use core::{
    Balance, Block, BlockBuilder, BlockContents, BlockHash, BlockType, Link, ProofOfWork, Seed,
    Signature, SigningKey, VerifyingKey, Work, WorkEncoding, WorkHandle, WorkThreshold,
};
pub use error::{LedgerError, Result};
pub use network::{
    message_decode, message_encode, pack_peers, unpack_peers, MessageType, Network, PeerSet,
    Protocol, Server, Transport, UdpTransport,
};
pub use storage::{BlockStore, MemoryStore, SledStore, Table};
