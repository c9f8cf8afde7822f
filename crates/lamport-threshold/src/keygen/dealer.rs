//! Share generation for a fresh threshold-controlled key.

use elliptic_curve::Field;
use k256::Scalar;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};
use zeroize::Zeroize;

use lamport_ots::{keccak256, PublicKey, KEY_BITS, PUBLIC_KEY_SIZE};

use crate::error::{Error, Result};
use crate::field::scalar_to_bytes;
use crate::keygen::{AdditiveShareSet, ShamirShareSet};
use crate::sharing::{additive_split, shamir_split, validate_threshold};

/// Generate a fresh Lamport key under Shamir t-of-n control.
///
/// Every preimage is drawn as a uniform field scalar, so whatever t-subset
/// later reconstructs it recovers the exact 32 canonical bytes that were
/// hashed into the public key. Returns one share set per party plus the
/// shared public key.
#[instrument(skip(rng))]
pub fn generate_shamir_key<R: RngCore + CryptoRng>(
    threshold: usize,
    parties: usize,
    rng: &mut R,
) -> Result<(Vec<ShamirShareSet>, PublicKey)> {
    validate_threshold(threshold, parties)?;

    let mut sets: Vec<ShamirShareSet> = (1..=parties)
        .map(|index| ShamirShareSet {
            party_id: format!("party-{index}"),
            index: index as u8,
            shares: vec![[[0u8; 32]; 2]; KEY_BITS],
        })
        .collect();
    let mut public_bytes = vec![0u8; PUBLIC_KEY_SIZE];

    for i in 0..KEY_BITS {
        for side in 0..2 {
            let preimage = Scalar::random(&mut *rng);
            let mut preimage_bytes = scalar_to_bytes(&preimage);

            let offset = i * 64 + side * 32;
            public_bytes[offset..offset + 32].copy_from_slice(&keccak256(&preimage_bytes));

            let split = shamir_split(&preimage, threshold, parties, rng)?;
            for (set, share) in sets.iter_mut().zip(split.iter()) {
                set.shares[i][side] = share.value;
            }
            preimage_bytes.zeroize();
        }
    }

    let public = PublicKey::from_bytes(&public_bytes)?;
    debug!(
        threshold,
        parties,
        pkh = %hex::encode(public.hash()),
        "dealt Shamir share sets"
    );
    Ok((sets, public))
}

/// Generate a fresh Lamport key under additive n-of-n control.
///
/// Weaker mode: all n parties are required for every signature and a single
/// compromised party leaks its full exposed range. Use
/// [`generate_shamir_key`] unless n-of-n is specifically wanted.
#[instrument(skip(rng))]
pub fn generate_additive_key<R: RngCore + CryptoRng>(
    parties: usize,
    rng: &mut R,
) -> Result<(Vec<AdditiveShareSet>, PublicKey)> {
    validate_threshold(parties, parties)?;

    let mut sets: Vec<AdditiveShareSet> = (1..=parties)
        .map(|index| AdditiveShareSet {
            party_id: format!("party-{index}"),
            index: index as u8,
            shares: vec![[[0u8; 32]; 2]; KEY_BITS],
        })
        .collect();
    let mut public_bytes = vec![0u8; PUBLIC_KEY_SIZE];

    for i in 0..KEY_BITS {
        for side in 0..2 {
            let mut preimage = [0u8; 32];
            rng.try_fill_bytes(&mut preimage)
                .map_err(|e| Error::Primitive(lamport_ots::Error::Rng(e.to_string())))?;

            let offset = i * 64 + side * 32;
            public_bytes[offset..offset + 32].copy_from_slice(&keccak256(&preimage));

            let split = additive_split(&preimage, parties, rng)?;
            for (set, share) in sets.iter_mut().zip(split.iter()) {
                set.shares[i][side] = share.value;
            }
            preimage.zeroize();
        }
    }

    let public = PublicKey::from_bytes(&public_bytes)?;
    debug!(
        parties,
        pkh = %hex::encode(public.hash()),
        "dealt additive share sets"
    );
    Ok((sets, public))
}
