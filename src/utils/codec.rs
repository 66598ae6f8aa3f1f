use crate::error::{LedgerError, Result};
use data_encoding::{HEXLOWER_PERMISSIVE, HEXUPPER};

/// Loose input accepted by `to_bytes`: raw bytes or a hex string
#[derive(Debug, Clone, Copy)]
pub enum ByteInput<'a> {
    Raw(&'a [u8]),
    Hex(&'a str),
}

impl<'a> From<&'a [u8]> for ByteInput<'a> {
    fn from(raw: &'a [u8]) -> Self {
        ByteInput::Raw(raw)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for ByteInput<'a> {
    fn from(raw: &'a [u8; N]) -> Self {
        ByteInput::Raw(raw.as_slice())
    }
}

impl<'a> From<&'a Vec<u8>> for ByteInput<'a> {
    fn from(raw: &'a Vec<u8>) -> Self {
        ByteInput::Raw(raw.as_slice())
    }
}

impl<'a> From<&'a str> for ByteInput<'a> {
    fn from(text: &'a str) -> Self {
        ByteInput::Hex(text)
    }
}

impl<'a> From<&'a String> for ByteInput<'a> {
    fn from(text: &'a String) -> Self {
        ByteInput::Hex(text.as_str())
    }
}

/// Check that `data` is hex for exactly `byte_length` bytes (0 = any length)
pub fn is_valid_hex(data: &str, byte_length: usize) -> bool {
    if byte_length != 0 && data.len() != byte_length * 2 {
        return false;
    }
    data.len() % 2 == 0 && data.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn hex_to_bytes(data: &str) -> Result<Vec<u8>> {
    HEXLOWER_PERMISSIVE
        .decode(data.as_bytes())
        .map_err(|e| LedgerError::Format(format!("Invalid hex string: {e}")))
}

/// Upper-case hex, the form used for hashes and keys in fixtures and logs
pub fn bytes_to_hex(data: &[u8]) -> String {
    HEXUPPER.encode(data)
}

/// Big-endian encoding of `value` into `bit_length / 8` bytes
pub fn int_to_bytes(value: u128, bit_length: usize) -> Result<Vec<u8>> {
    if bit_length == 0 || bit_length % 8 != 0 || bit_length > 128 {
        return Err(LedgerError::Format(format!(
            "Unsupported bit length: {bit_length}"
        )));
    }
    if bit_length < 128 && value >> bit_length != 0 {
        return Err(LedgerError::Format(format!(
            "Value {value} does not fit in {bit_length} bits"
        )));
    }
    let width = bit_length / 8;
    Ok(value.to_be_bytes()[16 - width..].to_vec())
}

/// Coerce raw bytes or a hex string into exactly `expected_byte_length` bytes.
///
/// `expected_byte_length == 0` disables the length check. When the input does
/// not fit, `strict` turns the miss into a `Format` error; otherwise `Ok(None)`
/// is returned so callers can try another coercion (an address, an integer).
pub fn to_bytes<'a>(
    data: impl Into<ByteInput<'a>>,
    expected_byte_length: usize,
    strict: bool,
) -> Result<Option<Vec<u8>>> {
    let bytes = match data.into() {
        ByteInput::Raw(raw) if expected_byte_length == 0 || raw.len() == expected_byte_length => {
            Some(raw.to_vec())
        }
        ByteInput::Hex(text) if is_valid_hex(text, expected_byte_length) => {
            Some(hex_to_bytes(text)?)
        }
        _ => None,
    };

    match bytes {
        Some(bytes) => Ok(Some(bytes)),
        None if strict => Err(LedgerError::Format(format!(
            "Data is not {expected_byte_length} bytes or a hex string of that length"
        ))),
        None => Ok(None),
    }
}

/// Strict coercion into a fixed-size array
pub fn to_fixed<'a, const N: usize>(data: impl Into<ByteInput<'a>>) -> Result<[u8; N]> {
    let bytes = to_bytes(data, N, true)?.unwrap_or_default();
    bytes.as_slice().try_into().map_err(|_| LedgerError::Length {
        expected: N,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_is_upper_case() {
        let bytes = hex_to_bytes("e89208dd").unwrap();
        assert_eq!(bytes, vec![0xE8, 0x92, 0x08, 0xDD]);
        assert_eq!(bytes_to_hex(&bytes), "E89208DD");
    }

    #[test]
    fn test_hex_rejects_non_hex_characters() {
        assert!(hex_to_bytes("E8G2").is_err());
        assert!(hex_to_bytes("ABC").is_err());
        assert!(!is_valid_hex("xyz0", 2));
    }

    #[test]
    fn test_hex_length_is_exact() {
        assert!(is_valid_hex("00FF", 2));
        assert!(!is_valid_hex("00FF", 3));
        assert!(!is_valid_hex("00FF00", 2));
        assert!(is_valid_hex("00FF00", 0));
    }

    #[test]
    fn test_int_to_bytes() {
        assert_eq!(int_to_bytes(1, 32).unwrap(), vec![0, 0, 0, 1]);
        assert_eq!(int_to_bytes(7075, 16).unwrap(), vec![0x1B, 0xA3]);
        assert_eq!(int_to_bytes(u128::MAX, 128).unwrap(), vec![0xFF; 16]);
        assert!(int_to_bytes(256, 8).is_err());
        assert!(int_to_bytes(1, 12).is_err());
    }

    #[test]
    fn test_to_bytes_raw_and_hex() {
        let raw = [1u8, 2, 3, 4];
        assert_eq!(to_bytes(&raw, 4, true).unwrap(), Some(raw.to_vec()));
        assert_eq!(to_bytes(&raw, 0, true).unwrap(), Some(raw.to_vec()));
        assert_eq!(to_bytes("01020304", 4, true).unwrap(), Some(raw.to_vec()));
    }

    #[test]
    fn test_to_bytes_strictness() {
        assert_eq!(to_bytes("0102", 4, false).unwrap(), None);
        assert!(matches!(
            to_bytes("0102", 4, true),
            Err(LedgerError::Format(_))
        ));
        let short = [0u8; 3];
        assert_eq!(to_bytes(&short, 4, false).unwrap(), None);
    }

    #[test]
    fn test_to_fixed() {
        let fixed: [u8; 2] = to_fixed("ABCD").unwrap();
        assert_eq!(fixed, [0xAB, 0xCD]);
        assert!(to_fixed::<2>("ABCDEF").is_err());
    }
}
