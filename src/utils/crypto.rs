//! Blake2b digests and the Ed25519 signature engine.
//!
//! Signatures are Ed25519 with Blake2b-512 in place of SHA-512, both for
//! expanding the secret key and for the signing/verification hashes.

use crate::core::types::{Signature, SigningKey, VerifyingKey};
use blake2::digest::consts::{U32, U5, U8};
use blake2::{Blake2b, Blake2b512, Digest};
use ed25519_dalek::hazmat::{raw_sign, raw_verify, ExpandedSecretKey};
use ed25519_dalek::{Signature as EdSignature, VerifyingKey as EdVerifyingKey};
use zeroize::Zeroize;

fn blake2b_into<D: Digest>(parts: &[&[u8]], out: &mut [u8]) {
    let mut hasher = D::new();
    for part in parts {
        hasher.update(part);
    }
    out.copy_from_slice(&hasher.finalize());
}

/// 32-byte digest: block hashes and key derivation
pub fn blake2b_256(parts: &[&[u8]]) -> [u8; 32] {
    let mut out = [0u8; 32];
    blake2b_into::<Blake2b<U32>>(parts, &mut out);
    out
}

/// 8-byte digest used by the proof-of-work check
pub fn blake2b_64(parts: &[&[u8]]) -> [u8; 8] {
    let mut out = [0u8; 8];
    blake2b_into::<Blake2b<U8>>(parts, &mut out);
    out
}

/// 5-byte digest used as the address checksum
pub fn blake2b_40(parts: &[&[u8]]) -> [u8; 5] {
    let mut out = [0u8; 5];
    blake2b_into::<Blake2b<U5>>(parts, &mut out);
    out
}

fn expand_signing_key(signing_key: &SigningKey) -> ExpandedSecretKey {
    let mut hash = [0u8; 64];
    blake2b_into::<Blake2b512>(&[signing_key.as_bytes().as_slice()], &mut hash);
    let expanded = ExpandedSecretKey::from_bytes(&hash);
    hash.zeroize();
    expanded
}

pub fn derive_verifying_key(signing_key: &SigningKey) -> VerifyingKey {
    let expanded = expand_signing_key(signing_key);
    VerifyingKey::from_bytes(EdVerifyingKey::from(&expanded).to_bytes())
}

/// Sign a message, in practice a 32-byte block hash
pub fn ed25519_blake2b_sign(signing_key: &SigningKey, message: &[u8]) -> Signature {
    let expanded = expand_signing_key(signing_key);
    let verifying_key = EdVerifyingKey::from(&expanded);
    let signature = raw_sign::<Blake2b512>(&expanded, message, &verifying_key);
    Signature::from_bytes(signature.to_bytes())
}

/// `false` for any failure: malformed key, bad signature, wrong message
pub fn ed25519_blake2b_verify(
    verifying_key: &VerifyingKey,
    message: &[u8],
    signature: &Signature,
) -> bool {
    let Ok(key) = EdVerifyingKey::from_bytes(verifying_key.as_bytes()) else {
        return false;
    };
    let signature = EdSignature::from_bytes(signature.as_bytes());
    raw_verify::<Blake2b512>(&key, message, &signature).is_ok()
}
