//! Utility functions and helpers
//!
//! Byte/hex coercion, the address base32 alphabet, Blake2b digests and the
//! Ed25519 signature engine used throughout the ledger.

pub mod base32;
pub mod codec;
pub mod crypto;

pub use codec::{bytes_to_hex, hex_to_bytes, int_to_bytes, is_valid_hex, to_bytes, ByteInput};
pub use crypto::{
    blake2b_256, blake2b_40, blake2b_64, derive_verifying_key, ed25519_blake2b_sign,
    ed25519_blake2b_verify,
};
