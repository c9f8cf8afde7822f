//! # Lamport Threshold
//!
//! t-of-n MPC control of a Lamport one-time key.
//!
//! Each party holds shares of every private preimage; no party (and no
//! coordinator) ever reconstructs a usable full private key. Signing runs in
//! two phases: parties first broadcast a commitment binding them to the
//! locally computed message digest, and only once enough commitments check
//! out does anyone reveal per-bit share material. Partials are aggregated —
//! Lagrange interpolation for Shamir shares, XOR for additive shares — into
//! one ordinary Lamport signature that any verifier checks without knowing
//! thresholds were involved.
//!
//! Two sharing modes exist and are deliberately kept apart in the type
//! system:
//! - [`SharingScheme::Shamir`] — true t-of-n; fewer than t shares carry no
//!   information about the preimages.
//! - [`SharingScheme::Additive`] — XOR n-of-n; every party is required and a
//!   single compromised party leaks its full share of the revealed side.
//!   This is the weaker mode and is never presented as equivalent to
//!   Shamir.
//!
//! ## Protocol Overview
//!
//! 1. **Setup** — a dealer splits all 512 preimages and hands each party
//!    its share set out-of-band; everyone learns the shared public key.
//! 2. **Phase 1 (commit)** — each party recomputes the domain-separated
//!    message itself and broadcasts `H(tx_digest || party_id)`.
//! 3. **Phase 2 (reveal)** — after t matching commitments, parties reveal
//!    their per-bit shares of the message-selected side only.
//! 4. **Aggregate** — reconstruct the 256 preimages, assemble the
//!    signature, and re-verify it against the shared public key before
//!    declaring success.

pub mod aggregate;
pub mod config;
pub mod error;
mod field;
pub mod keygen;
pub mod mpc;
pub mod partial;
pub mod protocol;
pub mod rotation;
pub mod session;
pub mod sharing;

pub use aggregate::{aggregate, aggregate_and_verify};
pub use config::{DigestCommitment, ThresholdConfig};
pub use error::{Error, Result};
pub use keygen::{
    generate_additive_key, generate_shamir_key, AdditiveShareSet, ShamirShareSet, ShareSet,
};
pub use mpc::{MemoryRelay, Relay};
pub use partial::{
    create_additive_partial, create_shamir_partial, AdditivePartial, PartialSignature,
    ShamirPartial,
};
pub use protocol::{new_session_id, run_signing, ROUND_COMMIT, ROUND_REVEAL};
pub use rotation::{generate_shamir_chain, ChainEntry, ShareChain, SharedKey};
pub use session::{Phase, SigningSession};
pub use sharing::{
    additive_reconstruct, additive_split, shamir_reconstruct, shamir_split, AdditiveShare,
    ShamirShare, SharingScheme,
};

/// Unique identifier for one signing session
pub type SessionId = [u8; 32];
