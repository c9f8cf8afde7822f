//! Scalar-field helpers for Shamir sharing.
//!
//! Shares live in the secp256k1 scalar field: a prime field whose modulus
//! sits just below 2^256, with constant-time add/mul/invert provided by
//! `k256`. Using a vetted big-integer field keeps share arithmetic
//! structurally independent of operand values instead of hand-rolling
//! reduction.

use k256::{
    elliptic_curve::{bigint::U256, ops::Reduce},
    Scalar,
};

use crate::error::{Error, Result};

/// Interpret 32 bytes as a field element (big-endian, reduced).
pub(crate) fn scalar_from_bytes(bytes: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce_bytes(&(*bytes).into())
}

/// Canonical 32-byte big-endian encoding of a field element.
pub(crate) fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&scalar.to_bytes());
    out
}

/// Evaluate a polynomial (coefficients in ascending degree order) at `x`.
pub(crate) fn eval_polynomial(coefficients: &[Scalar], x: u64) -> Scalar {
    let x = Scalar::from(x);
    let mut result = Scalar::ZERO;
    let mut x_power = Scalar::ONE;
    for coefficient in coefficients {
        result += *coefficient * x_power;
        x_power *= x;
    }
    result
}

/// Lagrange basis coefficient at x = 0 for the point at `index`, over the
/// evaluation points `indices`.
///
/// `indices` must be distinct and nonzero; a repeated index makes the
/// denominator vanish and is reported rather than unwrapped.
pub(crate) fn lagrange_at_zero(index: u8, indices: &[u8]) -> Result<Scalar> {
    let x_i = Scalar::from(index as u64);
    let mut numerator = Scalar::ONE;
    let mut denominator = Scalar::ONE;

    for &j in indices {
        if j == index {
            continue;
        }
        let x_j = Scalar::from(j as u64);
        numerator *= x_j;
        denominator *= x_j - x_i;
    }

    let inverse =
        Option::<Scalar>::from(denominator.invert()).ok_or(Error::DuplicateShare(index))?;
    Ok(numerator * inverse)
}
