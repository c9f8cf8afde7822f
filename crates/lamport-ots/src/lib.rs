//! # Lamport OTS
//!
//! Hash-based one-time signatures over Keccak-256.
//!
//! A private key is 256 pairs of random 32-byte preimages; the public key is
//! the Keccak-256 digest of each preimage. Signing a 32-byte message reveals
//! one preimage per message bit (MSB-first), so security rests entirely on
//! the preimage resistance of Keccak-256 and holds against quantum
//! adversaries.
//!
//! SECURITY: a key pair must sign exactly ONE message. Signing twice reveals
//! preimages from both sides of some positions and allows forgery. The
//! `used` flag is enforced with a single atomic check-and-set, so two
//! concurrent signing calls can never both succeed on the same key.
//!
//! ## Example
//!
//! ```rust,ignore
//! use lamport_ots::{keccak256, sign, verify, KeyPair};
//!
//! let pair = KeyPair::generate()?;
//! let message = keccak256(b"hello");
//! let signature = sign(&pair.private, &message)?;
//! assert!(verify(&pair.public, &message, &signature));
//! ```

pub mod chain;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;
pub mod verify;

pub use chain::KeyChain;
pub use error::{Error, Result};
pub use hash::{domain_separator, get_bit, keccak256, keccak256_concat, threshold_message};
pub use keys::{KeyPair, PrivateKey, PublicKey, PublicKeyHash, Signature};
pub use sign::{sign, sign_bytes, sign_threshold_message};
pub use verify::{
    batch_verify, verify, verify_bytes, verify_constant_time, verify_threshold_message,
    verify_with_pkh,
};

/// Number of message bits covered by one key (Keccak-256 output size in bits)
pub const KEY_BITS: usize = 256;

/// Size of each private preimage in bytes
pub const PREIMAGE_SIZE: usize = 32;

/// Size of a Keccak-256 digest in bytes
pub const HASH_SIZE: usize = 32;

/// Serialized private key size: 256 positions x 2 sides x 32 bytes
pub const PRIVATE_KEY_SIZE: usize = KEY_BITS * 2 * PREIMAGE_SIZE;

/// Serialized public key size: 256 positions x 2 sides x 32 bytes
pub const PUBLIC_KEY_SIZE: usize = KEY_BITS * 2 * HASH_SIZE;

/// Serialized signature size: 256 revealed preimages x 32 bytes
pub const SIGNATURE_SIZE: usize = KEY_BITS * PREIMAGE_SIZE;

/// Size of a public key hash (PKH)
pub const PUBLIC_KEY_HASH_SIZE: usize = 32;
