//! Shamir and additive secret sharing of 32-byte preimages.
//!
//! The two schemes have very different security models and are kept in
//! distinct types so callers cannot hand one mode's shares to the other's
//! reconstruction:
//!
//! - **Shamir** — a degree-(t-1) polynomial over the scalar field with the
//!   secret as constant term, evaluated at x = 1..=n. Any t points
//!   reconstruct the secret by Lagrange interpolation at 0; t-1 points are
//!   information-theoretically independent of it.
//! - **Additive** — n values whose XOR is the secret. All n are required,
//!   and a compromised party leaks its whole share. Strictly weaker; only
//!   offered for n-of-n setups.

use elliptic_curve::Field;
use k256::Scalar;
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};
use crate::field::{eval_polynomial, lagrange_at_zero, scalar_from_bytes, scalar_to_bytes};

/// Which sharing scheme a share set or partial belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharingScheme {
    /// True t-of-n polynomial sharing.
    Shamir,
    /// XOR n-of-n sharing; weaker model, every party required.
    Additive,
}

/// One point (x = `index`, y = `value`) on a sharing polynomial. The index
/// is the 1-based party identity and is never 0 (x = 0 holds the secret).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ShamirShare {
    #[zeroize(skip)]
    pub index: u8,
    /// Canonical scalar bytes of the polynomial evaluation.
    pub value: [u8; 32],
}

/// One of n XOR shares of a 32-byte secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AdditiveShare {
    #[zeroize(skip)]
    pub index: u8,
    pub value: [u8; 32],
}

/// Split a secret into n Shamir shares with reconstruction threshold t.
pub fn shamir_split<R: RngCore + CryptoRng>(
    secret: &Scalar,
    threshold: usize,
    parties: usize,
    rng: &mut R,
) -> Result<Vec<ShamirShare>> {
    validate_threshold(threshold, parties)?;

    let mut coefficients = Vec::with_capacity(threshold);
    coefficients.push(*secret);
    for _ in 1..threshold {
        coefficients.push(Scalar::random(&mut *rng));
    }

    Ok((1..=parties)
        .map(|x| ShamirShare {
            index: x as u8,
            value: scalar_to_bytes(&eval_polynomial(&coefficients, x as u64)),
        })
        .collect())
}

/// Reconstruct the secret from exactly the supplied shares by Lagrange
/// interpolation at x = 0.
///
/// Any t-subset of a valid degree-(t-1) split yields the identical secret.
/// The share count is the caller's contract — handing in fewer than t
/// shares produces a value unrelated to the secret, which is exactly the
/// information-theoretic guarantee.
pub fn shamir_reconstruct(shares: &[ShamirShare]) -> Result<Scalar> {
    if shares.is_empty() {
        return Err(Error::NotEnoughParties {
            required: 1,
            actual: 0,
        });
    }

    let indices = distinct_indices(shares.iter().map(|s| s.index))?;

    let mut secret = Scalar::ZERO;
    for share in shares {
        let lambda = lagrange_at_zero(share.index, &indices)?;
        secret += lambda * scalar_from_bytes(&share.value);
    }
    Ok(secret)
}

/// Split a secret into n XOR shares: n-1 uniformly random, the last the XOR
/// of the secret with all others.
pub fn additive_split<R: RngCore + CryptoRng>(
    secret: &[u8; 32],
    parties: usize,
    rng: &mut R,
) -> Result<Vec<AdditiveShare>> {
    validate_threshold(parties, parties)?;

    let mut shares = Vec::with_capacity(parties);
    let mut running = *secret;
    for index in 1..parties {
        let mut value = [0u8; 32];
        rng.try_fill_bytes(&mut value)
            .map_err(|e| Error::Primitive(lamport_ots::Error::Rng(e.to_string())))?;
        for (r, v) in running.iter_mut().zip(value.iter()) {
            *r ^= v;
        }
        shares.push(AdditiveShare {
            index: index as u8,
            value,
        });
    }
    shares.push(AdditiveShare {
        index: parties as u8,
        value: running,
    });
    Ok(shares)
}

/// XOR all n shares back together. Every share is required: a missing or
/// extra share makes the result garbage, so the expected party count is
/// checked up front.
pub fn additive_reconstruct(shares: &[AdditiveShare], parties: usize) -> Result<[u8; 32]> {
    if shares.len() != parties {
        return Err(Error::NotEnoughParties {
            required: parties,
            actual: shares.len(),
        });
    }
    distinct_indices(shares.iter().map(|s| s.index))?;

    let mut secret = [0u8; 32];
    for share in shares {
        for (s, v) in secret.iter_mut().zip(share.value.iter()) {
            *s ^= v;
        }
    }
    Ok(secret)
}

pub(crate) fn validate_threshold(threshold: usize, parties: usize) -> Result<()> {
    if threshold < 1 || threshold > parties || parties > u8::MAX as usize {
        return Err(Error::InvalidThreshold { threshold, parties });
    }
    Ok(())
}

/// Collect indices, rejecting zeros and duplicates.
pub(crate) fn distinct_indices(iter: impl Iterator<Item = u8>) -> Result<Vec<u8>> {
    let mut indices = Vec::new();
    for index in iter {
        if index == 0 {
            return Err(Error::ZeroShareIndex);
        }
        if indices.contains(&index) {
            return Err(Error::DuplicateShare(index));
        }
        indices.push(index);
    }
    Ok(indices)
}
