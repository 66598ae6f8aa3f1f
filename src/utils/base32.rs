//! Address base32: a 32-symbol alphabet without `0`, `2`, `l` and `v`.
//!
//! Unlike RFC 4648 the zero padding that rounds the bit stream up to a
//! multiple of five goes in front of the data, so a 32-byte key encodes to
//! 52 symbols whose first one only carries a single data bit.

use crate::error::{LedgerError, Result};

pub const ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

fn symbol_value(symbol: char) -> Option<u8> {
    ALPHABET
        .iter()
        .position(|&c| c as char == symbol)
        .map(|index| index as u8)
}

pub fn encode(data: &[u8]) -> String {
    let total_bits = data.len() * 8;
    let padding = (5 - total_bits % 5) % 5;

    let mut bits = Vec::with_capacity(total_bits + padding);
    bits.resize(padding, false);
    for byte in data {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }

    bits.chunks(5)
        .map(|group| {
            let index = group
                .iter()
                .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit));
            ALPHABET[index] as char
        })
        .collect()
}

pub fn decode(data: &str) -> Result<Vec<u8>> {
    let mut bits = Vec::with_capacity(data.len() * 5);
    for symbol in data.chars() {
        let value = symbol_value(symbol).ok_or_else(|| {
            LedgerError::Format(format!("Character not in base32 alphabet: {symbol}"))
        })?;
        for shift in (0..5).rev() {
            bits.push((value >> shift) & 1 == 1);
        }
    }

    // the leading bits are padding; rotating them to the end and dropping
    // them leaves a whole number of bytes
    let padding = bits.len() % 8;
    if bits[..padding].iter().any(|&bit| bit) {
        return Err(LedgerError::Format(
            "Non-zero padding bits in base32 data".to_string(),
        ));
    }

    Ok(bits[padding..]
        .chunks(8)
        .map(|byte| {
            byte.iter()
                .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit))
        })
        .collect())
}
