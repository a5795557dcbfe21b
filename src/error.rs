//! Error types for StarLedger

use thiserror::Error;

/// Failures surfaced by the ledger's write path, configuration and crypto helpers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Challenge expired: {elapsed}s elapsed, window is {window}s")]
    ExpiredChallenge { elapsed: u64, window: u64 },
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),
    #[error("Malformed challenge: {0}")]
    MalformedChallenge(String),
    #[error("Chain is not initialized")]
    Uninitialized,
    #[error("Cryptographic error: {0}")]
    CryptoError(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        LedgerError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

/// A single inconsistency found while auditing the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The stored hash no longer matches the block's contents.
    #[error("Block {0} hash does not match its contents")]
    InvalidBlockHash(u64),
    /// The previous-hash link does not point at the block below.
    #[error("Block {0} previous hash does not match the hash of the block below it")]
    BrokenPreviousLink(u64),
}

impl ValidationError {
    pub fn height(&self) -> u64 {
        match self {
            ValidationError::InvalidBlockHash(h) | ValidationError::BrokenPreviousLink(h) => *h,
        }
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
