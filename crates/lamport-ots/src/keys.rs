//! Key material and fixed-size serialization.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::{Error, Result};
use crate::hash::keccak256;
use crate::{
    HASH_SIZE, KEY_BITS, PREIMAGE_SIZE, PRIVATE_KEY_SIZE, PUBLIC_KEY_HASH_SIZE, PUBLIC_KEY_SIZE,
    SIGNATURE_SIZE,
};

/// Keccak-256 digest of a serialized public key; the compact on-chain
/// identifier for one key.
pub type PublicKeyHash = [u8; PUBLIC_KEY_HASH_SIZE];

/// A Lamport private key: 256 pairs of 32-byte preimages.
///
/// Not `Clone` — exactly one copy owns the one-time property. Preimages are
/// wiped on drop. The `used` flag flips false -> true exactly once, under a
/// single atomic check-and-set.
pub struct PrivateKey {
    preimages: Box<[[[u8; PREIMAGE_SIZE]; 2]; KEY_BITS]>,
    used: AtomicBool,
}

impl PrivateKey {
    /// Whether this key has already signed a message.
    pub fn is_used(&self) -> bool {
        self.used.load(Ordering::SeqCst)
    }

    /// Atomically claim the single signing use of this key.
    ///
    /// At most one caller ever succeeds; every later (or concurrent losing)
    /// caller gets `KeyAlreadyUsed`.
    pub(crate) fn try_consume(&self) -> Result<()> {
        self.used
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| Error::KeyAlreadyUsed)
    }

    pub(crate) fn mark_used(&self) {
        self.used.store(true, Ordering::SeqCst);
    }

    pub(crate) fn preimage(&self, position: usize, bit: usize) -> &[u8; PREIMAGE_SIZE] {
        &self.preimages[position][bit]
    }

    /// Serialize to the fixed 16,384-byte layout: for each position, the
    /// 0-side preimage then the 1-side preimage.
    ///
    /// The output is raw secret material; callers are responsible for
    /// wiping it.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; PRIVATE_KEY_SIZE];
        for i in 0..KEY_BITS {
            out[i * 64..i * 64 + 32].copy_from_slice(&self.preimages[i][0]);
            out[i * 64 + 32..i * 64 + 64].copy_from_slice(&self.preimages[i][1]);
        }
        out
    }

    /// Deserialize from the fixed 16,384-byte layout. The restored key is
    /// unused.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != PRIVATE_KEY_SIZE {
            return Err(Error::InvalidPrivateKey {
                expected: PRIVATE_KEY_SIZE,
                actual: data.len(),
            });
        }
        let mut preimages = Box::new([[[0u8; PREIMAGE_SIZE]; 2]; KEY_BITS]);
        for i in 0..KEY_BITS {
            preimages[i][0].copy_from_slice(&data[i * 64..i * 64 + 32]);
            preimages[i][1].copy_from_slice(&data[i * 64 + 32..i * 64 + 64]);
        }
        Ok(Self {
            preimages,
            used: AtomicBool::new(false),
        })
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.preimages.as_mut().zeroize();
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("used", &self.is_used())
            .finish_non_exhaustive()
    }
}

/// A Lamport public key: 256 pairs of Keccak-256 digests, one per private
/// preimage. Immutable after creation.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey {
    hashes: Box<[[[u8; HASH_SIZE]; 2]; KEY_BITS]>,
}

impl PublicKey {
    pub(crate) fn digest(&self, position: usize, bit: usize) -> &[u8; HASH_SIZE] {
        &self.hashes[position][bit]
    }

    /// Serialize to the fixed 16,384-byte layout: for each position, the
    /// 0-side digest then the 1-side digest.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; PUBLIC_KEY_SIZE];
        for i in 0..KEY_BITS {
            out[i * 64..i * 64 + 32].copy_from_slice(&self.hashes[i][0]);
            out[i * 64 + 32..i * 64 + 64].copy_from_slice(&self.hashes[i][1]);
        }
        out
    }

    /// Deserialize from the fixed 16,384-byte layout.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != PUBLIC_KEY_SIZE {
            return Err(Error::InvalidPublicKey {
                expected: PUBLIC_KEY_SIZE,
                actual: data.len(),
            });
        }
        let mut hashes = Box::new([[[0u8; HASH_SIZE]; 2]; KEY_BITS]);
        for i in 0..KEY_BITS {
            hashes[i][0].copy_from_slice(&data[i * 64..i * 64 + 32]);
            hashes[i][1].copy_from_slice(&data[i * 64 + 32..i * 64 + 64]);
        }
        Ok(Self { hashes })
    }

    /// The public key hash (PKH): Keccak-256 of the serialized key.
    pub fn hash(&self) -> PublicKeyHash {
        keccak256(&self.to_bytes())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(pkh: {})", hex::encode(self.hash()))
    }
}

/// A Lamport signature: the 256 preimages revealed for one message, one per
/// bit.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    preimages: Box<[[u8; PREIMAGE_SIZE]; KEY_BITS]>,
}

impl Signature {
    pub(crate) fn from_preimages(preimages: Box<[[u8; PREIMAGE_SIZE]; KEY_BITS]>) -> Self {
        Self { preimages }
    }

    pub(crate) fn preimage(&self, position: usize) -> &[u8; PREIMAGE_SIZE] {
        &self.preimages[position]
    }

    /// Serialize to the fixed 8,192-byte layout: preimages in position
    /// order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; SIGNATURE_SIZE];
        for i in 0..KEY_BITS {
            out[i * 32..(i + 1) * 32].copy_from_slice(&self.preimages[i]);
        }
        out
    }

    /// Deserialize from the fixed 8,192-byte layout.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() != SIGNATURE_SIZE {
            return Err(Error::InvalidSignature {
                expected: SIGNATURE_SIZE,
                actual: data.len(),
            });
        }
        let mut preimages = Box::new([[0u8; PREIMAGE_SIZE]; KEY_BITS]);
        for i in 0..KEY_BITS {
            preimages[i].copy_from_slice(&data[i * 32..(i + 1) * 32]);
        }
        Ok(Self { preimages })
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signature").finish_non_exhaustive()
    }
}

/// A freshly generated private/public key pair.
#[derive(Debug)]
pub struct KeyPair {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyPair {
    /// Generate a key pair from the operating system RNG.
    pub fn generate() -> Result<Self> {
        Self::generate_from_rng(&mut OsRng)
    }

    /// Generate a key pair from the given random source. Fails only if the
    /// source fails.
    pub fn generate_from_rng<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut preimages = Box::new([[[0u8; PREIMAGE_SIZE]; 2]; KEY_BITS]);
        let mut hashes = Box::new([[[0u8; HASH_SIZE]; 2]; KEY_BITS]);

        for i in 0..KEY_BITS {
            for bit in 0..2 {
                rng.try_fill_bytes(&mut preimages[i][bit])
                    .map_err(|e| Error::Rng(e.to_string()))?;
                hashes[i][bit] = keccak256(&preimages[i][bit]);
            }
        }

        Ok(Self {
            private: PrivateKey {
                preimages,
                used: AtomicBool::new(false),
            },
            public: PublicKey { hashes },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_key_is_hash_of_preimages() {
        let pair = KeyPair::generate().unwrap();
        assert!(!pair.private.is_used());

        for i in 0..KEY_BITS {
            for bit in 0..2 {
                let expected = keccak256(pair.private.preimage(i, bit));
                assert_eq!(&expected, pair.public.digest(i, bit));
            }
        }
    }

    #[test]
    fn private_key_round_trips() {
        let pair = KeyPair::generate().unwrap();
        let data = pair.private.to_bytes();
        assert_eq!(data.len(), PRIVATE_KEY_SIZE);

        let restored = PrivateKey::from_bytes(&data).unwrap();
        assert!(!restored.is_used());
        for i in 0..KEY_BITS {
            for bit in 0..2 {
                assert_eq!(restored.preimage(i, bit), pair.private.preimage(i, bit));
            }
        }
    }

    #[test]
    fn public_key_round_trips() {
        let pair = KeyPair::generate().unwrap();
        let data = pair.public.to_bytes();
        assert_eq!(data.len(), PUBLIC_KEY_SIZE);

        let restored = PublicKey::from_bytes(&data).unwrap();
        assert_eq!(restored, pair.public);
        assert_eq!(restored.hash(), pair.public.hash());
    }

    #[test]
    fn wrong_lengths_are_rejected_before_any_hashing() {
        assert_eq!(
            PrivateKey::from_bytes(&[0u8; 7]).unwrap_err(),
            Error::InvalidPrivateKey {
                expected: PRIVATE_KEY_SIZE,
                actual: 7
            }
        );
        assert_eq!(
            PublicKey::from_bytes(&vec![0u8; PUBLIC_KEY_SIZE + 1]).unwrap_err(),
            Error::InvalidPublicKey {
                expected: PUBLIC_KEY_SIZE,
                actual: PUBLIC_KEY_SIZE + 1
            }
        );
        assert_eq!(
            Signature::from_bytes(&[]).unwrap_err(),
            Error::InvalidSignature {
                expected: SIGNATURE_SIZE,
                actual: 0
            }
        );
    }

    #[test]
    fn pkh_distinguishes_keys() {
        let a = KeyPair::generate().unwrap();
        let b = KeyPair::generate().unwrap();
        assert_eq!(a.public.hash(), a.public.hash());
        assert_ne!(a.public.hash(), b.public.hash());
    }

    #[test]
    fn try_consume_succeeds_exactly_once() {
        let pair = KeyPair::generate().unwrap();
        assert!(pair.private.try_consume().is_ok());
        assert_eq!(pair.private.try_consume().unwrap_err(), Error::KeyAlreadyUsed);
        assert!(pair.private.is_used());
    }
}
