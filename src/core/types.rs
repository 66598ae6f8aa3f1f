//! Fixed-width byte types shared by keys, blocks and messages

use crate::error::{LedgerError, Result};
use crate::utils::codec::{bytes_to_hex, to_fixed};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name([u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub const fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| LedgerError::Length {
                    expected: $len,
                    actual: bytes.len(),
                })?;
                Ok(Self(array))
            }

            pub fn from_hex(text: &str) -> Result<Self> {
                Ok(Self(to_fixed(text)?))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                bytes_to_hex(&self.0)
            }

            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|&b| b == 0)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self([0u8; $len])
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self> {
                Self::from_hex(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }
    };
}

macro_rules! secret_bytes {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
        pub struct $name([u8; 32]);

        impl $name {
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            pub fn from_hex(text: &str) -> Result<Self> {
                Ok(Self(to_fixed(text)?))
            }

            /// Exposes the secret; keep the borrow short
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                bytes_to_hex(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}([REDACTED])", stringify!($name))
            }
        }
    };
}

secret_bytes!(
    /// Root secret; every signing key of a wallet is derived from it by index
    Seed
);

secret_bytes!(
    /// Ed25519 secret key (the 32-byte seed form)
    SigningKey
);

fixed_bytes!(
    /// Ed25519 public key, also the payload of an address
    VerifyingKey,
    32
);

fixed_bytes!(
    /// Blake2b-256 content hash of a block
    BlockHash,
    32
);

fixed_bytes!(
    /// State block link: a source block hash or a destination key
    Link,
    32
);

fixed_bytes!(Signature, 64);

fixed_bytes!(
    /// Proof-of-work nonce, in the byte order it is serialized with its block
    Work,
    8
);

/// 128-bit raw amount, serialized big-endian
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Balance(u128);

impl Balance {
    pub const LEN: usize = 16;

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(&self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    pub fn from_hex(text: &str) -> Result<Self> {
        Ok(Self::from_be_bytes(to_fixed(text)?))
    }

    pub fn to_hex(&self) -> String {
        bytes_to_hex(&self.to_be_bytes())
    }
}

impl From<u128> for Balance {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Balance({})", self.0)
    }
}
