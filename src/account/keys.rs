use crate::core::types::{Seed, SigningKey, VerifyingKey};
use crate::utils::{blake2b_256, derive_verifying_key};

/// Deterministic signing key for `index`: Blake2b-256(seed ++ index as big-endian u32)
pub fn seed_to_signing_key(seed: &Seed, index: u32) -> SigningKey {
    SigningKey::from_bytes(blake2b_256(&[
        seed.as_bytes().as_slice(),
        &index.to_be_bytes(),
    ]))
}

pub fn signing_to_verifying_key(signing_key: &SigningKey) -> VerifyingKey {
    derive_verifying_key(signing_key)
}
