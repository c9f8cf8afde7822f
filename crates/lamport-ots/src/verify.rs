//! Signature verification.
//!
//! `verify` is the canonical bit-selection/hash-check loop; every other
//! verifier path (constant-time, PKH-checked, threshold-message, batch)
//! derives from the same algorithm and must stay bit-for-bit compatible
//! with the external settlement verifier.

use subtle::{Choice, ConstantTimeEq};

use crate::hash::{get_bit, keccak256, threshold_message};
use crate::keys::{PublicKey, PublicKeyHash, Signature};
use crate::KEY_BITS;

/// Check a signature against a public key and message.
///
/// For each bit i of the message, `keccak256(sig[i])` must equal
/// `pub[i][bit]`. Returns false on the first mismatch; when the timing of
/// verification is attacker-observable, use [`verify_constant_time`].
pub fn verify(public: &PublicKey, message: &[u8; 32], signature: &Signature) -> bool {
    for i in 0..KEY_BITS {
        let bit = get_bit(message, i);
        if &keccak256(signature.preimage(i)) != public.digest(i, bit) {
            return false;
        }
    }
    true
}

/// Check a signature without early exit.
///
/// All 256 positions are hashed and compared regardless of mismatches; the
/// comparisons accumulate into a single [`Choice`] so the running time does
/// not depend on where (or whether) the signature is wrong.
pub fn verify_constant_time(public: &PublicKey, message: &[u8; 32], signature: &Signature) -> bool {
    let mut ok = Choice::from(1u8);
    for i in 0..KEY_BITS {
        let bit = get_bit(message, i);
        let actual = keccak256(signature.preimage(i));
        ok &= actual.ct_eq(public.digest(i, bit));
    }
    ok.into()
}

/// Verify a signature against a message slice; non-32-byte messages fail.
pub fn verify_bytes(public: &PublicKey, message: &[u8], signature: &Signature) -> bool {
    match <[u8; 32]>::try_from(message) {
        Ok(msg) => verify(public, &msg, signature),
        Err(_) => false,
    }
}

/// Verify a signature and check that the public key hashes to
/// `expected_pkh`. Used where only the PKH is stored.
pub fn verify_with_pkh(
    public: &PublicKey,
    message: &[u8; 32],
    signature: &Signature,
    expected_pkh: &PublicKeyHash,
) -> bool {
    if &public.hash() != expected_pkh {
        return false;
    }
    verify(public, message, signature)
}

/// Verify a domain-separated threshold signature, PKH included.
pub fn verify_threshold_message(
    public: &PublicKey,
    signature: &Signature,
    tx_digest: &[u8; 32],
    next_pkh: &PublicKeyHash,
    verifier_instance: &[u8; 20],
    chain_id: u64,
    expected_pkh: &PublicKeyHash,
) -> bool {
    if &public.hash() != expected_pkh {
        return false;
    }
    let message = threshold_message(tx_digest, next_pkh, verifier_instance, chain_id);
    verify(public, &message, signature)
}

/// Verify many signatures, one result per input. Inputs with mismatched
/// slice lengths produce all-false results.
#[cfg(feature = "multi-thread")]
pub fn batch_verify(
    publics: &[PublicKey],
    messages: &[[u8; 32]],
    signatures: &[Signature],
) -> Vec<bool> {
    use rayon::prelude::*;

    if messages.len() != publics.len() || signatures.len() != publics.len() {
        return vec![false; publics.len()];
    }
    publics
        .par_iter()
        .zip(messages.par_iter())
        .zip(signatures.par_iter())
        .map(|((public, message), signature)| verify(public, message, signature))
        .collect()
}

#[cfg(not(feature = "multi-thread"))]
pub fn batch_verify(
    publics: &[PublicKey],
    messages: &[[u8; 32]],
    signatures: &[Signature],
) -> Vec<bool> {
    if messages.len() != publics.len() || signatures.len() != publics.len() {
        return vec![false; publics.len()];
    }
    publics
        .iter()
        .zip(messages.iter())
        .zip(signatures.iter())
        .map(|((public, message), signature)| verify(public, message, signature))
        .collect()
}
