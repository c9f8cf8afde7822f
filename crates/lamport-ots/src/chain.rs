//! Key-rotation chains: pre-generated sequences of one-time keys.

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use tracing::debug;

use crate::error::{Error, Result};
use crate::keys::{KeyPair, PublicKeyHash, Signature};
use crate::sign::sign;

/// An ordered sequence of one-time key pairs with a monotone cursor.
///
/// Advancing marks the current key used and moves the cursor forward; a key
/// pair is never returned as current twice. The hash of the *next* key is
/// what gets embedded in the current signature as the rotation commitment.
pub struct KeyChain {
    keys: Vec<KeyPair>,
    cursor: usize,
    used: usize,
}

impl KeyChain {
    /// Generate a chain of `len` independent key pairs from the OS RNG.
    pub fn new(len: usize) -> Result<Self> {
        Self::new_from_rng(len, &mut OsRng)
    }

    /// Generate a chain of `len` independent key pairs from the given
    /// random source.
    pub fn new_from_rng<R: RngCore + CryptoRng>(len: usize, rng: &mut R) -> Result<Self> {
        if len == 0 {
            return Err(Error::EmptyChain);
        }
        let keys = (0..len)
            .map(|_| KeyPair::generate_from_rng(rng))
            .collect::<Result<Vec<_>>>()?;
        debug!(len, "generated key chain");
        Ok(Self {
            keys,
            cursor: 0,
            used: 0,
        })
    }

    /// The current (unused) key pair.
    pub fn current(&self) -> Result<&KeyPair> {
        self.keys.get(self.cursor).ok_or(Error::ChainExhausted)
    }

    /// PKH of the key one position ahead of the cursor — the rotation
    /// commitment for the current signature.
    pub fn next_pkh(&self) -> Result<PublicKeyHash> {
        if self.cursor >= self.keys.len() {
            return Err(Error::ChainExhausted);
        }
        self.keys
            .get(self.cursor + 1)
            .map(|pair| pair.public.hash())
            .ok_or(Error::NoNextKey)
    }

    /// Mark the current key used and move the cursor forward.
    pub fn advance(&mut self) -> Result<()> {
        let pair = self.keys.get(self.cursor).ok_or(Error::ChainExhausted)?;
        pair.private.mark_used();
        self.cursor += 1;
        self.used += 1;
        Ok(())
    }

    /// Number of unused keys left.
    pub fn remaining(&self) -> usize {
        self.keys.len() - self.cursor
    }

    /// Number of keys consumed so far.
    pub fn used_count(&self) -> usize {
        self.used
    }

    /// Total chain length.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sign with the current key and advance.
    ///
    /// The rotation commitment (next key's PKH) is captured *before*
    /// `advance` mutates the cursor; it refers to the chain state the
    /// signature was produced under. `None` means the chain's last key just
    /// signed.
    pub fn sign_next(&mut self, message: &[u8; 32]) -> Result<(Signature, Option<PublicKeyHash>)> {
        if self.cursor >= self.keys.len() {
            return Err(Error::ChainExhausted);
        }
        let signature = sign(&self.keys[self.cursor].private, message)?;
        let next_pkh = self.keys.get(self.cursor + 1).map(|pair| pair.public.hash());
        self.advance()?;
        Ok((signature, next_pkh))
    }
}
