//! Per-party partial signatures: the revealed share of each selected
//! preimage for a concrete message.

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use lamport_ots::{get_bit, KEY_BITS};

use crate::error::Result;
use crate::keygen::{check_share_set_len, AdditiveShareSet, ShamirShareSet};
use crate::sharing::SharingScheme;

/// One party's Shamir contribution to a signature: for each of the 256 bit
/// positions, the party's share of the preimage on the selected side.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ShamirPartial {
    #[zeroize(skip)]
    pub party_id: String,
    #[zeroize(skip)]
    pub index: u8,
    /// Message digest the shares were selected for.
    #[zeroize(skip)]
    pub digest: [u8; 32],
    /// Always 256 entries, one per bit position.
    pub values: Vec<[u8; 32]>,
}

/// One party's additive (XOR) contribution to a signature.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AdditivePartial {
    #[zeroize(skip)]
    pub party_id: String,
    #[zeroize(skip)]
    pub index: u8,
    #[zeroize(skip)]
    pub digest: [u8; 32],
    pub values: Vec<[u8; 32]>,
}

/// A partial signature tagged by sharing scheme. Partials from different
/// schemes never aggregate together.
#[derive(Clone, Serialize, Deserialize)]
pub enum PartialSignature {
    Shamir(ShamirPartial),
    Additive(AdditivePartial),
}

impl PartialSignature {
    pub fn scheme(&self) -> SharingScheme {
        match self {
            PartialSignature::Shamir(_) => SharingScheme::Shamir,
            PartialSignature::Additive(_) => SharingScheme::Additive,
        }
    }

    pub fn party_id(&self) -> &str {
        match self {
            PartialSignature::Shamir(p) => &p.party_id,
            PartialSignature::Additive(p) => &p.party_id,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            PartialSignature::Shamir(p) => p.index,
            PartialSignature::Additive(p) => p.index,
        }
    }

    pub fn digest(&self) -> &[u8; 32] {
        match self {
            PartialSignature::Shamir(p) => &p.digest,
            PartialSignature::Additive(p) => &p.digest,
        }
    }
}

/// Select this party's share on the message-chosen side of every position.
pub fn create_shamir_partial(
    set: &ShamirShareSet,
    message: &[u8; 32],
) -> Result<ShamirPartial> {
    check_share_set_len(set.shares.len())?;

    let values = select_sides(&set.shares, message);
    debug!(party_id = %set.party_id, index = set.index, "created Shamir partial");
    Ok(ShamirPartial {
        party_id: set.party_id.clone(),
        index: set.index,
        digest: *message,
        values,
    })
}

/// Additive counterpart of [`create_shamir_partial`].
pub fn create_additive_partial(
    set: &AdditiveShareSet,
    message: &[u8; 32],
) -> Result<AdditivePartial> {
    check_share_set_len(set.shares.len())?;

    let values = select_sides(&set.shares, message);
    debug!(party_id = %set.party_id, index = set.index, "created additive partial");
    Ok(AdditivePartial {
        party_id: set.party_id.clone(),
        index: set.index,
        digest: *message,
        values,
    })
}

fn select_sides(shares: &[[[u8; 32]; 2]], message: &[u8; 32]) -> Vec<[u8; 32]> {
    (0..KEY_BITS)
        .map(|i| shares[i][get_bit(message, i)])
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;
    use crate::keygen::generate_shamir_key;

    #[test]
    fn partial_selects_message_side() {
        let (sets, _) = generate_shamir_key(2, 3, &mut OsRng).unwrap();
        let mut message = [0u8; 32];
        message[0] = 0b1010_0000;

        let partial = create_shamir_partial(&sets[0], &message).unwrap();
        assert_eq!(partial.values.len(), KEY_BITS);
        assert_eq!(partial.values[0], sets[0].shares[0][1]);
        assert_eq!(partial.values[1], sets[0].shares[1][0]);
        assert_eq!(partial.values[2], sets[0].shares[2][1]);
        assert_eq!(partial.digest, message);
    }

    #[test]
    fn truncated_share_set_is_rejected() {
        let (mut sets, _) = generate_shamir_key(2, 3, &mut OsRng).unwrap();
        sets[0].shares.truncate(100);
        assert!(matches!(
            create_shamir_partial(&sets[0], &[0u8; 32]),
            Err(crate::Error::InvalidPartial(_))
        ));
    }

    #[test]
    fn partial_round_trips_through_json() {
        let (sets, _) = generate_shamir_key(2, 3, &mut OsRng).unwrap();
        let partial = sets[1].clone();
        let partial = create_shamir_partial(&partial, &[9u8; 32]).unwrap();
        let json = serde_json::to_vec(&PartialSignature::Shamir(partial.clone())).unwrap();
        let back: PartialSignature = serde_json::from_slice(&json).unwrap();
        assert_eq!(back.index(), partial.index);
        assert_eq!(back.digest(), &partial.digest);
    }
}
