//! Dealer-based key generation for threshold-controlled Lamport keys.
//!
//! A dealer draws all 512 private half-values, derives the shared public
//! key, and splits every half-value into per-party shares. Share sets are
//! then distributed out-of-band; the dealer must forget the plaintext
//! preimages afterwards. No usable full private key exists at any party at
//! any later point.

mod dealer;

pub use dealer::{generate_additive_key, generate_shamir_key};

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use lamport_ots::KEY_BITS;

use crate::error::{Error, Result};
use crate::partial::{create_additive_partial, create_shamir_partial, PartialSignature};
use crate::sharing::SharingScheme;

/// One party's Shamir shares of an entire Lamport private key: for each of
/// the 256 positions and both sides, the polynomial evaluation at this
/// party's index.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ShamirShareSet {
    #[zeroize(skip)]
    pub party_id: String,
    /// 1-based evaluation point; never 0.
    #[zeroize(skip)]
    pub index: u8,
    /// `shares[i][side]` — canonical scalar bytes. Always 256 entries.
    pub shares: Vec<[[u8; 32]; 2]>,
}

/// One party's XOR shares of an entire Lamport private key.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AdditiveShareSet {
    #[zeroize(skip)]
    pub party_id: String,
    #[zeroize(skip)]
    pub index: u8,
    /// `shares[i][side]`. Always 256 entries.
    pub shares: Vec<[[u8; 32]; 2]>,
}

/// A party's share set, tagged by scheme so the two security models cannot
/// be conflated downstream.
#[derive(Clone, Serialize, Deserialize)]
pub enum ShareSet {
    Shamir(ShamirShareSet),
    Additive(AdditiveShareSet),
}

impl ShareSet {
    pub fn scheme(&self) -> SharingScheme {
        match self {
            ShareSet::Shamir(_) => SharingScheme::Shamir,
            ShareSet::Additive(_) => SharingScheme::Additive,
        }
    }

    pub fn party_id(&self) -> &str {
        match self {
            ShareSet::Shamir(set) => &set.party_id,
            ShareSet::Additive(set) => &set.party_id,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            ShareSet::Shamir(set) => set.index,
            ShareSet::Additive(set) => set.index,
        }
    }

    /// Reveal this party's per-bit shares for `message` (selected side
    /// only).
    pub fn create_partial(&self, message: &[u8; 32]) -> Result<PartialSignature> {
        match self {
            ShareSet::Shamir(set) => Ok(PartialSignature::Shamir(create_shamir_partial(
                set, message,
            )?)),
            ShareSet::Additive(set) => Ok(PartialSignature::Additive(create_additive_partial(
                set, message,
            )?)),
        }
    }
}

pub(crate) fn check_share_set_len(len: usize) -> Result<()> {
    if len != KEY_BITS {
        return Err(Error::InvalidPartial(format!(
            "share set covers {len} positions, expected {KEY_BITS}"
        )));
    }
    Ok(())
}
