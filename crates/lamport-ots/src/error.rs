//! Error types for Lamport signature operations

use thiserror::Error;

/// Result type alias for Lamport signature operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating, using, or decoding Lamport keys
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Attempt to sign twice with a one-time key
    #[error("key already used (one-time property violated)")]
    KeyAlreadyUsed,

    /// No unused keys left in a key chain
    #[error("key chain exhausted")]
    ChainExhausted,

    /// The current key is the last in its chain, so no rotation target exists
    #[error("no next key available in chain")]
    NoNextKey,

    /// A key chain must hold at least one key
    #[error("key chain length must be positive")]
    EmptyChain,

    /// Message is not exactly 32 bytes
    #[error("invalid message length: expected 32 bytes, got {0}")]
    InvalidMessage(usize),

    /// Private key buffer has the wrong length
    #[error("invalid private key encoding: expected {expected} bytes, got {actual}")]
    InvalidPrivateKey { expected: usize, actual: usize },

    /// Public key buffer has the wrong length
    #[error("invalid public key encoding: expected {expected} bytes, got {actual}")]
    InvalidPublicKey { expected: usize, actual: usize },

    /// Signature buffer has the wrong length
    #[error("invalid signature encoding: expected {expected} bytes, got {actual}")]
    InvalidSignature { expected: usize, actual: usize },

    /// The random source failed while drawing key material
    #[error("random source failure: {0}")]
    Rng(String),
}
