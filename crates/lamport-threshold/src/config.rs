//! Session configuration and digest commitments.

use serde::{Deserialize, Serialize};

use lamport_ots::{keccak256_concat, threshold_message, PublicKeyHash};

use crate::error::Result;
use crate::sharing::validate_threshold;

/// Configuration one party carries through a threshold signing session.
///
/// `chain_id` and `verifier_instance` are the domain-separation tuple; they
/// bind every signed message to one network and one verifier deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Minimum number of parties needed to sign (t in t-of-n)
    pub threshold: usize,

    /// Total number of parties (n in t-of-n)
    pub parties: usize,

    /// This party's identifier
    pub party_id: String,

    /// Network identity, bound into every message to stop cross-network
    /// replay
    pub chain_id: u64,

    /// Verifier deployment identity (20-byte address-like), bound into
    /// every message to stop cross-contract replay
    pub verifier_instance: [u8; 20],
}

impl ThresholdConfig {
    /// Create a configuration; rejects `t < 1` or `t > n` outright.
    pub fn new(
        threshold: usize,
        parties: usize,
        party_id: impl Into<String>,
        chain_id: u64,
        verifier_instance: [u8; 20],
    ) -> Result<Self> {
        validate_threshold(threshold, parties)?;
        Ok(Self {
            threshold,
            parties,
            party_id: party_id.into(),
            chain_id,
            verifier_instance,
        })
    }

    /// The domain-separated message to sign.
    ///
    /// Every party computes this locally from the transaction digest and
    /// rotation commitment — a pre-packaged digest from a coordinator is
    /// never trusted.
    pub fn compute_message(&self, tx_digest: &[u8; 32], next_pkh: &PublicKeyHash) -> [u8; 32] {
        threshold_message(tx_digest, next_pkh, &self.verifier_instance, self.chain_id)
    }

    /// This party's phase-1 commitment to the transaction digest.
    pub fn digest_commitment(&self, tx_digest: &[u8; 32]) -> DigestCommitment {
        DigestCommitment {
            party_id: self.party_id.clone(),
            commitment: keccak256_concat(&[tx_digest, self.party_id.as_bytes()]),
        }
    }
}

/// Hash binding a party to an agreed digest, broadcast before any secret
/// material is revealed. `commitment = keccak256(tx_digest || party_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestCommitment {
    pub party_id: String,
    pub commitment: [u8; 32],
}

impl DigestCommitment {
    /// Check this commitment against a locally recomputed digest.
    pub fn verify_against(&self, tx_digest: &[u8; 32]) -> bool {
        self.commitment == keccak256_concat(&[tx_digest, self.party_id.as_bytes()])
    }
}
