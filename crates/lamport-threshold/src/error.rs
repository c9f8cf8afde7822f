//! Error types for threshold signing

use thiserror::Error;

/// Result type alias for threshold operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during threshold key setup and signing
#[derive(Debug, Error)]
pub enum Error {
    /// Threshold outside 1 <= t <= n (never clamped)
    #[error("invalid threshold: need 1 <= t <= n, got t={threshold}, n={parties}")]
    InvalidThreshold { threshold: usize, parties: usize },

    /// Too few contributions to reconstruct
    #[error("not enough parties: required {required}, got {actual}")]
    NotEnoughParties { required: usize, actual: usize },

    /// A party committed to, or revealed for, a different digest —
    /// equivocation or a forged coordinator message; fatal to the session
    #[error("digest mismatch: parties disagree on the message")]
    DigestMismatch,

    /// A partial signature is structurally unusable
    #[error("invalid partial signature: {0}")]
    InvalidPartial(String),

    /// The reconstructed signature failed verification against the shared
    /// public key; indicates a corrupted share or non-uniform subset
    #[error("aggregated signature failed verification against the shared public key")]
    AggregationFailed,

    /// Shamir and additive share material mixed in one session
    #[error("sharing scheme mismatch between partials")]
    SchemeMismatch,

    /// Two shares carry the same party index
    #[error("duplicate share index {0}")]
    DuplicateShare(u8),

    /// Share index 0 would place the secret itself on the polynomial
    #[error("share index must be nonzero")]
    ZeroShareIndex,

    /// No share material exists for the named party index
    #[error("no share set for party index {0}")]
    UnknownParty(u8),

    /// The same party contributed twice in one phase
    #[error("party {0} already contributed in this phase")]
    DuplicateParty(String),

    /// Operation does not belong to the session's current phase
    #[error("session is not in the {expected} phase")]
    WrongPhase { expected: &'static str },

    /// The session was abandoned; nothing from it may be reused
    #[error("session aborted")]
    SessionAborted,

    /// No unused shared keys left in the rotation chain
    #[error("threshold key chain exhausted")]
    ChainExhausted,

    /// Phase deadline expired
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),

    /// Wire encoding failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Transport-level failure
    #[error("relay error: {0}")]
    Relay(String),

    /// Failure in the underlying one-time-signature primitive
    #[error(transparent)]
    Primitive(#[from] lamport_ots::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
