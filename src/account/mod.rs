//! Accounts: seed derivation, addresses, signing
//!
//! An account is identified by its Ed25519 verifying key. I derive signing
//! keys from a wallet seed by index and show verifying keys to people as
//! checksummed `xrb_` addresses.

#[allow(clippy::module_inception)]
pub mod account;
pub mod address;
pub mod keys;

pub use account::Account;
pub use address::{
    address_to_verifying_key, address_valid, to_verifying_key, verifying_key_to_address,
    ADDRESS_CHECK_SUM_LEN, ADDRESS_LEN, ADDRESS_PREFIX,
};
pub use keys::{seed_to_signing_key, signing_to_verifying_key};
