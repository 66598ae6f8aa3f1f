//! Error handling for the ledger primitives
//!
//! Every failure in the core is local and synchronous. Signature and
//! proof-of-work checks are not errors: they return `bool`.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Error kinds for key, block, message and storage operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Hex, base32 or fixed-width byte coercion failed
    Format(String),
    /// A block field is missing or unusable for the requested operation
    Field(String),
    /// Signing key, verifying key and address disagree
    Mismatch(String),
    /// The operation needs a key the account does not hold
    State(String),
    /// Packed bytes are not the fixed size of the block variant
    Length { expected: usize, actual: usize },
    /// Bad magic bytes, short header or unknown type code on the wire
    Protocol(String),
    /// Unknown block or message type name
    UnknownType(String),
    /// Database-related errors
    Database(String),
    /// Socket and peer errors
    Network(String),
    /// Configuration errors
    Config(String),
    /// File I/O errors
    Io(String),
    /// Work generation errors
    Mining(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::Format(msg) => write!(f, "Format error: {msg}"),
            LedgerError::Field(msg) => write!(f, "Field error: {msg}"),
            LedgerError::Mismatch(msg) => write!(f, "Key mismatch: {msg}"),
            LedgerError::State(msg) => write!(f, "State error: {msg}"),
            LedgerError::Length { expected, actual } => {
                write!(
                    f,
                    "Invalid data length: expected {expected} bytes, got {actual}"
                )
            }
            LedgerError::Protocol(msg) => write!(f, "Protocol error: {msg}"),
            LedgerError::UnknownType(name) => write!(f, "Unknown type: {name}"),
            LedgerError::Database(msg) => write!(f, "Database error: {msg}"),
            LedgerError::Network(msg) => write!(f, "Network error: {msg}"),
            LedgerError::Config(msg) => write!(f, "Configuration error: {msg}"),
            LedgerError::Io(msg) => write!(f, "I/O error: {msg}"),
            LedgerError::Mining(msg) => write!(f, "Mining error: {msg}"),
        }
    }
}

impl std::error::Error for LedgerError {}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::Io(err.to_string())
    }
}

impl From<sled::Error> for LedgerError {
    fn from(err: sled::Error) -> Self {
        LedgerError::Database(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}
