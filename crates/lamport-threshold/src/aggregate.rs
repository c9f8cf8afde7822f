//! Combining partial signatures into a full Lamport signature.
//!
//! Aggregation runs at an untrusted coordinator, so [`aggregate_and_verify`]
//! always re-verifies the assembled signature against the shared public key
//! before releasing it. A coordinator that skips verification can only hand
//! out garbage, never a forgery.

use k256::Scalar;
use tracing::{debug, instrument, warn};
use zeroize::Zeroize;

use lamport_ots::{verify, PublicKey, Signature, KEY_BITS, SIGNATURE_SIZE};

use crate::error::{Error, Result};
use crate::field::{lagrange_at_zero, scalar_from_bytes, scalar_to_bytes};
use crate::partial::{AdditivePartial, PartialSignature, ShamirPartial};
use crate::sharing::{distinct_indices, SharingScheme};

/// Aggregate partials into a signature without verifying it. All partials
/// must share one scheme and one digest; Shamir needs at least `threshold`
/// of them, additive exactly `parties`.
#[instrument(skip(partials), fields(count = partials.len()))]
pub fn aggregate(
    partials: &[PartialSignature],
    threshold: usize,
    parties: usize,
) -> Result<Signature> {
    let first = partials.first().ok_or(Error::NotEnoughParties {
        required: threshold,
        actual: 0,
    })?;

    let scheme = first.scheme();
    let digest = *first.digest();
    for partial in partials {
        if partial.scheme() != scheme {
            return Err(Error::SchemeMismatch);
        }
        if partial.digest() != &digest {
            return Err(Error::DigestMismatch);
        }
    }

    match scheme {
        SharingScheme::Shamir => {
            let shamir: Vec<&ShamirPartial> = partials
                .iter()
                .map(|p| match p {
                    PartialSignature::Shamir(p) => p,
                    PartialSignature::Additive(_) => unreachable!("scheme checked above"),
                })
                .collect();
            aggregate_shamir(&shamir, threshold)
        }
        SharingScheme::Additive => {
            let additive: Vec<&AdditivePartial> = partials
                .iter()
                .map(|p| match p {
                    PartialSignature::Additive(p) => p,
                    PartialSignature::Shamir(_) => unreachable!("scheme checked above"),
                })
                .collect();
            aggregate_additive(&additive, parties)
        }
    }
}

/// Aggregate and re-verify against the shared public key. This is the only
/// entry point coordinators should use.
pub fn aggregate_and_verify(
    partials: &[PartialSignature],
    threshold: usize,
    parties: usize,
    public_key: &PublicKey,
    message: &[u8; 32],
) -> Result<Signature> {
    let signature = aggregate(partials, threshold, parties)?;
    if !verify(public_key, message, &signature) {
        warn!("aggregated signature failed verification, rejecting");
        return Err(Error::AggregationFailed);
    }
    debug!("aggregated signature verified");
    Ok(signature)
}

fn aggregate_shamir(partials: &[&ShamirPartial], threshold: usize) -> Result<Signature> {
    if partials.len() < threshold {
        return Err(Error::NotEnoughParties {
            required: threshold,
            actual: partials.len(),
        });
    }
    for partial in partials {
        if partial.values.len() != KEY_BITS {
            return Err(Error::InvalidPartial(format!(
                "partial from {} covers {} positions",
                partial.party_id,
                partial.values.len()
            )));
        }
    }

    let indices = distinct_indices(partials.iter().map(|p| p.index))?;

    // one Lagrange coefficient per party, shared by all 256 positions
    let lambdas = partials
        .iter()
        .map(|p| lagrange_at_zero(p.index, &indices))
        .collect::<Result<Vec<Scalar>>>()?;

    let mut bytes = vec![0u8; SIGNATURE_SIZE];
    for i in 0..KEY_BITS {
        let mut preimage = Scalar::ZERO;
        for (partial, lambda) in partials.iter().zip(lambdas.iter()) {
            preimage += *lambda * scalar_from_bytes(&partial.values[i]);
        }
        bytes[i * 32..(i + 1) * 32].copy_from_slice(&scalar_to_bytes(&preimage));
    }

    let signature = Signature::from_bytes(&bytes)?;
    bytes.zeroize();
    Ok(signature)
}

fn aggregate_additive(partials: &[&AdditivePartial], parties: usize) -> Result<Signature> {
    if partials.len() != parties {
        return Err(Error::NotEnoughParties {
            required: parties,
            actual: partials.len(),
        });
    }
    for partial in partials {
        if partial.values.len() != KEY_BITS {
            return Err(Error::InvalidPartial(format!(
                "partial from {} covers {} positions",
                partial.party_id,
                partial.values.len()
            )));
        }
    }
    distinct_indices(partials.iter().map(|p| p.index))?;

    let mut bytes = vec![0u8; SIGNATURE_SIZE];
    for i in 0..KEY_BITS {
        let chunk = &mut bytes[i * 32..(i + 1) * 32];
        for partial in partials {
            for (c, v) in chunk.iter_mut().zip(partial.values[i].iter()) {
                *c ^= v;
            }
        }
    }

    let signature = Signature::from_bytes(&bytes)?;
    bytes.zeroize();
    Ok(signature)
}
