//! Signing operations.

use tracing::debug;

use crate::error::{Error, Result};
use crate::hash::{get_bit, threshold_message};
use crate::keys::{PrivateKey, PublicKeyHash, Signature};
use crate::{KEY_BITS, PREIMAGE_SIZE};

/// Sign a 32-byte message, revealing one preimage per bit.
///
/// The key's single use is claimed atomically before any preimage is
/// copied, so two concurrent calls on the same key can never both return a
/// signature. The second (and every later) attempt fails with
/// `KeyAlreadyUsed`.
pub fn sign(private: &PrivateKey, message: &[u8; 32]) -> Result<Signature> {
    private.try_consume()?;

    let mut preimages = Box::new([[0u8; PREIMAGE_SIZE]; KEY_BITS]);
    for i in 0..KEY_BITS {
        let bit = get_bit(message, i);
        preimages[i].copy_from_slice(private.preimage(i, bit));
    }

    debug!(message = %hex::encode(message), "signed one-time message");
    Ok(Signature::from_preimages(preimages))
}

/// Sign a message slice, rejecting anything that is not exactly 32 bytes.
pub fn sign_bytes(private: &PrivateKey, message: &[u8]) -> Result<Signature> {
    let msg: [u8; 32] = message
        .try_into()
        .map_err(|_| Error::InvalidMessage(message.len()))?;
    sign(private, &msg)
}

/// Sign a domain-separated threshold message.
///
/// Composes [`threshold_message`] with [`sign`]; this is the format the
/// settlement verifier checks.
pub fn sign_threshold_message(
    private: &PrivateKey,
    tx_digest: &[u8; 32],
    next_pkh: &PublicKeyHash,
    verifier_instance: &[u8; 20],
    chain_id: u64,
) -> Result<Signature> {
    let message = threshold_message(tx_digest, next_pkh, verifier_instance, chain_id);
    sign(private, &message)
}
