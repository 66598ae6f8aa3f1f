use crate::core::types::VerifyingKey;
use crate::error::{LedgerError, Result};
use crate::utils::{base32, blake2b_40, to_bytes};

pub const ADDRESS_PREFIX: &str = "xrb_";
pub const ADDRESS_CHECK_SUM_LEN: usize = 5;
/// Prefix, 52 key symbols and 8 checksum symbols
pub const ADDRESS_LEN: usize = 64;
const KEY_END: usize = 56;

fn checksum(verifying_key: &VerifyingKey) -> [u8; ADDRESS_CHECK_SUM_LEN] {
    let mut checksum = blake2b_40(&[verifying_key.as_bytes().as_slice()]);
    checksum.reverse();
    checksum
}

pub fn verifying_key_to_address(verifying_key: &VerifyingKey) -> String {
    let mut address = String::with_capacity(ADDRESS_LEN);
    address.push_str(ADDRESS_PREFIX);
    address.push_str(&base32::encode(verifying_key.as_bytes()));
    address.push_str(&base32::encode(&checksum(verifying_key)));
    address
}

/// Decode the key part of an address. The checksum is not verified here;
/// use `address_valid` for that.
pub fn address_to_verifying_key(address: &str) -> Result<VerifyingKey> {
    if !address.starts_with(ADDRESS_PREFIX) {
        return Err(LedgerError::Format(format!(
            "Address must start with {ADDRESS_PREFIX}: {address}"
        )));
    }
    let encoded = address
        .get(ADDRESS_PREFIX.len()..KEY_END)
        .ok_or_else(|| LedgerError::Format(format!("Address too short: {address}")))?;
    VerifyingKey::from_slice(&base32::decode(encoded)?)
}

/// Round-trip check: the decoded key must re-encode to the same string
pub fn address_valid(address: &str) -> bool {
    match address_to_verifying_key(address) {
        Ok(verifying_key) => verifying_key_to_address(&verifying_key) == address,
        Err(_) => false,
    }
}

/// Accept a verifying key as 64 hex characters or as a checksummed address
pub fn to_verifying_key(text: &str) -> Result<VerifyingKey> {
    if let Some(bytes) = to_bytes(text, VerifyingKey::LEN, false)? {
        return VerifyingKey::from_slice(&bytes);
    }
    if address_valid(text) {
        return address_to_verifying_key(text);
    }
    Err(LedgerError::Format(format!(
        "Not a verifying key or a valid address: {text}"
    )))
}
