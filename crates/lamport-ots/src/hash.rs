//! Keccak-256 helpers, canonical bit selection, and domain-separated
//! message construction.
//!
//! Every verifier of these signatures (this crate, the threshold
//! aggregator, and the external settlement verifier) must agree byte-for-
//! byte on `get_bit` and on the packed layouts below; the hash function is
//! fixed to Keccak-256 and is not pluggable.

use tiny_keccak::{Hasher, Keccak};

use crate::{keys::PublicKeyHash, HASH_SIZE};

/// Compute the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; HASH_SIZE] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; HASH_SIZE];
    hasher.finalize(&mut out);
    out
}

/// Compute the Keccak-256 digest of the concatenation of `parts`.
pub fn keccak256_concat(parts: &[&[u8]]) -> [u8; HASH_SIZE] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_SIZE];
    hasher.finalize(&mut out);
    out
}

/// Bit `i` of a 32-byte message, 0-indexed MSB-first: bit 0 is the most
/// significant bit of byte 0.
#[inline]
pub fn get_bit(message: &[u8; 32], i: usize) -> usize {
    debug_assert!(i < 256);
    ((message[i / 8] >> (7 - (i % 8))) & 1) as usize
}

/// Domain separator binding a verifier instance and network.
///
/// Layout: `instance (20) || chain_id as uint256 (32)`, hashed.
pub fn domain_separator(verifier_instance: &[u8; 20], chain_id: u64) -> [u8; 32] {
    let mut buf = [0u8; 52];
    buf[..20].copy_from_slice(verifier_instance);
    buf[44..52].copy_from_slice(&chain_id.to_be_bytes());
    keccak256(&buf)
}

/// The message actually signed in threshold mode.
///
/// Layout: `tx_digest (32) || next_pkh (32) || instance (20) || chain_id as
/// uint256 (32)`, hashed. Binding the rotation commitment, the verifier
/// instance, and the network into the message prevents cross-context
/// replay; every party and the settlement verifier recompute this
/// identically.
pub fn threshold_message(
    tx_digest: &[u8; 32],
    next_pkh: &PublicKeyHash,
    verifier_instance: &[u8; 20],
    chain_id: u64,
) -> [u8; 32] {
    let mut buf = [0u8; 116];
    buf[0..32].copy_from_slice(tx_digest);
    buf[32..64].copy_from_slice(next_pkh);
    buf[64..84].copy_from_slice(verifier_instance);
    buf[108..116].copy_from_slice(&chain_id.to_be_bytes());
    keccak256(&buf)
}
