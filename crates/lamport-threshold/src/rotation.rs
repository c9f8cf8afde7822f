//! Key rotation for threshold-controlled Lamport keys.
//!
//! One-time keys burn on use, so parties hold a pre-dealt chain of shared
//! keys and bind each signature to the hash of the next public key. The
//! verifier learns the successor key the moment a signature lands, before
//! the current key is spent.

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, instrument};

use lamport_ots::{PublicKey, PublicKeyHash};

use crate::error::{Error, Result};
use crate::keygen::{generate_shamir_key, ShamirShareSet};

/// Dealer output for one chain link: every party's share set plus the
/// shared public key.
#[derive(Clone)]
pub struct SharedKey {
    pub share_sets: Vec<ShamirShareSet>,
    pub public_key: PublicKey,
}

/// Deal a chain of `length` independent shared keys under the same t-of-n
/// policy. Links share nothing but the policy; burning one reveals nothing
/// about the next.
#[instrument(skip(rng))]
pub fn generate_shamir_chain<R: RngCore + CryptoRng>(
    length: usize,
    threshold: usize,
    parties: usize,
    rng: &mut R,
) -> Result<Vec<SharedKey>> {
    if length == 0 {
        return Err(Error::Primitive(lamport_ots::Error::EmptyChain));
    }
    (0..length)
        .map(|_| {
            let (share_sets, public_key) = generate_shamir_key(threshold, parties, rng)?;
            Ok(SharedKey {
                share_sets,
                public_key,
            })
        })
        .collect()
}

/// One party's view of a single chain link.
#[derive(Clone)]
pub struct ChainEntry {
    pub share_set: ShamirShareSet,
    pub public_key: PublicKey,
}

/// One party's walk along a dealt chain.
///
/// The cursor only moves forward; [`ShareChain::advance`] must be called
/// exactly when the current key's signature has been released, in lockstep
/// across all parties.
pub struct ShareChain {
    entries: Vec<ChainEntry>,
    cursor: usize,
}

impl ShareChain {
    /// Extract the share sets belonging to party `index` from a dealt
    /// chain.
    pub fn for_party(chain: &[SharedKey], index: u8) -> Result<Self> {
        if chain.is_empty() {
            return Err(Error::Primitive(lamport_ots::Error::EmptyChain));
        }
        let entries = chain
            .iter()
            .map(|key| {
                let share_set = key
                    .share_sets
                    .iter()
                    .find(|set| set.index == index)
                    .cloned()
                    .ok_or(Error::UnknownParty(index))?;
                Ok(ChainEntry {
                    share_set,
                    public_key: key.public_key.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { entries, cursor: 0 })
    }

    /// The link signatures are currently made with.
    pub fn current(&self) -> Result<&ChainEntry> {
        self.entries.get(self.cursor).ok_or(Error::ChainExhausted)
    }

    /// Hash of the successor public key, captured before any advance. None
    /// on the final link.
    pub fn next_pkh(&self) -> Result<Option<PublicKeyHash>> {
        if self.cursor >= self.entries.len() {
            return Err(Error::ChainExhausted);
        }
        Ok(self
            .entries
            .get(self.cursor + 1)
            .map(|entry| entry.public_key.hash()))
    }

    /// Move to the next link once the current key has signed.
    pub fn advance(&mut self) -> Result<()> {
        if self.cursor >= self.entries.len() {
            return Err(Error::ChainExhausted);
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "advanced share chain");
        Ok(())
    }

    pub fn remaining(&self) -> usize {
        self.entries.len().saturating_sub(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
