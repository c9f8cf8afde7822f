//! Coordinator-side state machine for one threshold signing session.
//!
//! Two phases, strictly ordered: every participating party first commits to
//! the transaction digest it intends to sign, and only once enough matching
//! commitments are in do partials get accepted. Partials themselves are
//! tagged with the domain-separated message, which the session recomputes
//! from the digest and rotation commitment — the same construction every
//! party performs in [`crate::protocol::run_signing`]. A commitment or
//! partial for a different digest aborts the whole session, since signing a
//! mismatched digest would burn the one-time key for nothing.

use tracing::{debug, info, instrument, warn};

use lamport_ots::{PublicKey, PublicKeyHash, Signature};

use crate::aggregate::aggregate_and_verify;
use crate::config::{DigestCommitment, ThresholdConfig};
use crate::error::{Error, Result};
use crate::partial::PartialSignature;
use crate::sharing::SharingScheme;
use crate::SessionId;

/// Where a session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CollectingCommitments,
    CollectingPartials,
    Complete,
    Aborted,
}

/// One signing session at the coordinator.
pub struct SigningSession {
    session_id: SessionId,
    config: ThresholdConfig,
    scheme: SharingScheme,
    public_key: PublicKey,
    tx_digest: [u8; 32],
    message: [u8; 32],
    phase: Phase,
    commitments: Vec<DigestCommitment>,
    partials: Vec<PartialSignature>,
    signature: Option<Signature>,
}

impl SigningSession {
    /// Start a session for `tx_digest` under the given config.
    ///
    /// Commitments bind the raw transaction digest; the message actually
    /// signed is recomputed here from the digest, the rotation commitment
    /// `next_pkh`, and the config's domain tuple, never accepted
    /// pre-packaged from anyone.
    pub fn new(
        config: ThresholdConfig,
        scheme: SharingScheme,
        public_key: PublicKey,
        tx_digest: [u8; 32],
        next_pkh: PublicKeyHash,
    ) -> Self {
        let session_id: SessionId = rand::random();
        let message = config.compute_message(&tx_digest, &next_pkh);
        info!(
            session_id = %hex::encode(session_id),
            threshold = config.threshold,
            parties = config.parties,
            "new signing session"
        );
        Self {
            session_id,
            config,
            scheme,
            public_key,
            tx_digest,
            message,
            phase: Phase::CollectingCommitments,
            commitments: Vec::new(),
            partials: Vec::new(),
            signature: None,
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn tx_digest(&self) -> &[u8; 32] {
        &self.tx_digest
    }

    /// The domain-separated message partials must be computed against.
    pub fn message(&self) -> &[u8; 32] {
        &self.message
    }

    /// Completed signature, once the session reaches [`Phase::Complete`].
    pub fn signature(&self) -> Option<&Signature> {
        self.signature.as_ref()
    }

    /// Number of parties whose contribution is required: the threshold for
    /// Shamir, every party for additive.
    pub fn required(&self) -> usize {
        match self.scheme {
            SharingScheme::Shamir => self.config.threshold,
            SharingScheme::Additive => self.config.parties,
        }
    }

    /// Accept a party's digest commitment. A commitment that does not open
    /// to this session's digest aborts the session.
    #[instrument(skip(self, commitment), fields(party_id = %commitment.party_id))]
    pub fn add_commitment(&mut self, commitment: DigestCommitment) -> Result<Phase> {
        self.check_phase(Phase::CollectingCommitments, "COLLECTING_COMMITMENTS")?;

        if self
            .commitments
            .iter()
            .any(|c| c.party_id == commitment.party_id)
        {
            return Err(Error::DuplicateParty(commitment.party_id));
        }
        if !commitment.verify_against(&self.tx_digest) {
            warn!("digest commitment mismatch, aborting session");
            self.phase = Phase::Aborted;
            return Err(Error::DigestMismatch);
        }

        self.commitments.push(commitment);
        if self.commitments.len() >= self.required() {
            debug!(count = self.commitments.len(), "commitment phase complete");
            self.phase = Phase::CollectingPartials;
        }
        Ok(self.phase)
    }

    /// Accept a party's partial signature. Only parties that committed may
    /// reveal, and only for the session's message. Once enough partials
    /// are in, the session aggregates, re-verifies, and completes; an
    /// aggregate that fails verification aborts the session for good —
    /// the same inputs are never retried.
    #[instrument(skip(self, partial), fields(party_id = %partial.party_id()))]
    pub fn add_partial(&mut self, partial: PartialSignature) -> Result<Phase> {
        self.check_phase(Phase::CollectingPartials, "COLLECTING_PARTIALS")?;

        if partial.scheme() != self.scheme {
            return Err(Error::SchemeMismatch);
        }
        if !self
            .commitments
            .iter()
            .any(|c| c.party_id == partial.party_id())
        {
            return Err(Error::InvalidPartial(format!(
                "party {} never committed",
                partial.party_id()
            )));
        }
        if self.partials.iter().any(|p| p.party_id() == partial.party_id()) {
            return Err(Error::DuplicateParty(partial.party_id().to_string()));
        }
        if partial.digest() != &self.message {
            warn!("partial for a different message, aborting session");
            self.phase = Phase::Aborted;
            return Err(Error::DigestMismatch);
        }

        self.partials.push(partial);
        if self.partials.len() >= self.required() {
            let signature = match aggregate_and_verify(
                &self.partials,
                self.config.threshold,
                self.config.parties,
                &self.public_key,
                &self.message,
            ) {
                Ok(signature) => signature,
                Err(e) => {
                    warn!(
                        session_id = %hex::encode(self.session_id),
                        "aggregation failed, aborting session"
                    );
                    self.phase = Phase::Aborted;
                    return Err(e);
                }
            };
            info!(
                session_id = %hex::encode(self.session_id),
                "session complete"
            );
            self.signature = Some(signature);
            self.phase = Phase::Complete;
        }
        Ok(self.phase)
    }

    /// Abort the session. Terminal; every later contribution is rejected.
    pub fn abort(&mut self) {
        if self.phase != Phase::Complete {
            warn!(session_id = %hex::encode(self.session_id), "session aborted");
            self.phase = Phase::Aborted;
        }
    }

    fn check_phase(&self, expected: Phase, name: &'static str) -> Result<()> {
        if self.phase == Phase::Aborted {
            return Err(Error::SessionAborted);
        }
        if self.phase != expected {
            return Err(Error::WrongPhase { expected: name });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;
    use crate::keygen::{generate_shamir_key, ShamirShareSet};
    use crate::partial::{create_shamir_partial, ShamirPartial};

    struct Fixture {
        session: SigningSession,
        sets: Vec<ShamirShareSet>,
        tx_digest: [u8; 32],
        message: [u8; 32],
    }

    fn session_fixture() -> Fixture {
        let (sets, public) = generate_shamir_key(2, 3, &mut OsRng).unwrap();
        let config = ThresholdConfig::new(2, 3, "coordinator", 1, [0u8; 20]).unwrap();
        let tx_digest = lamport_ots::keccak256(b"session fixture");
        let next_pkh = [0x42u8; 32];
        let message = config.compute_message(&tx_digest, &next_pkh);
        let session =
            SigningSession::new(config, SharingScheme::Shamir, public, tx_digest, next_pkh);
        Fixture {
            session,
            sets,
            tx_digest,
            message,
        }
    }

    fn commitment_for(party_id: &str, digest: &[u8; 32]) -> DigestCommitment {
        let config = ThresholdConfig::new(2, 3, party_id, 1, [0u8; 20]).unwrap();
        config.digest_commitment(digest)
    }

    fn shamir(partial: ShamirPartial) -> PartialSignature {
        PartialSignature::Shamir(partial)
    }

    #[test]
    fn full_lifecycle_reaches_complete() {
        let Fixture {
            mut session,
            sets,
            tx_digest,
            message,
        } = session_fixture();
        assert_eq!(session.phase(), Phase::CollectingCommitments);

        assert_eq!(
            session
                .add_commitment(commitment_for("party-1", &tx_digest))
                .unwrap(),
            Phase::CollectingCommitments
        );
        assert_eq!(
            session
                .add_commitment(commitment_for("party-2", &tx_digest))
                .unwrap(),
            Phase::CollectingPartials
        );

        let p1 = shamir(create_shamir_partial(&sets[0], &message).unwrap());
        let p2 = shamir(create_shamir_partial(&sets[1], &message).unwrap());
        assert_eq!(session.add_partial(p1).unwrap(), Phase::CollectingPartials);
        assert_eq!(session.add_partial(p2).unwrap(), Phase::Complete);

        let signature = session.signature().unwrap();
        assert!(lamport_ots::verify(&session.public_key, &message, signature));
    }

    #[test]
    fn partial_before_commitment_phase_is_rejected() {
        let Fixture {
            mut session,
            sets,
            message,
            ..
        } = session_fixture();
        let partial = shamir(create_shamir_partial(&sets[0], &message).unwrap());
        assert!(matches!(
            session.add_partial(partial),
            Err(Error::WrongPhase {
                expected: "COLLECTING_PARTIALS"
            })
        ));
    }

    #[test]
    fn mismatched_commitment_aborts() {
        let Fixture { mut session, .. } = session_fixture();
        let other = lamport_ots::keccak256(b"some other digest");
        assert!(matches!(
            session.add_commitment(commitment_for("party-1", &other)),
            Err(Error::DigestMismatch)
        ));
        assert_eq!(session.phase(), Phase::Aborted);
        assert!(matches!(
            session.add_commitment(commitment_for("party-2", &other)),
            Err(Error::SessionAborted)
        ));
    }

    #[test]
    fn partial_tagged_with_raw_digest_aborts() {
        let Fixture {
            mut session,
            sets,
            tx_digest,
            ..
        } = session_fixture();
        session
            .add_commitment(commitment_for("party-1", &tx_digest))
            .unwrap();
        session
            .add_commitment(commitment_for("party-2", &tx_digest))
            .unwrap();

        // shares selected by the undomain-separated digest, not the message
        let partial = shamir(create_shamir_partial(&sets[0], &tx_digest).unwrap());
        assert!(matches!(
            session.add_partial(partial),
            Err(Error::DigestMismatch)
        ));
        assert_eq!(session.phase(), Phase::Aborted);
    }

    #[test]
    fn uncommitted_party_cannot_reveal() {
        let Fixture {
            mut session,
            sets,
            tx_digest,
            message,
        } = session_fixture();
        session
            .add_commitment(commitment_for("party-1", &tx_digest))
            .unwrap();
        session
            .add_commitment(commitment_for("party-2", &tx_digest))
            .unwrap();

        // sets[2] belongs to party-3, which never committed
        let partial = shamir(create_shamir_partial(&sets[2], &message).unwrap());
        assert!(matches!(
            session.add_partial(partial),
            Err(Error::InvalidPartial(_))
        ));
    }

    #[test]
    fn duplicate_contributions_are_rejected() {
        let Fixture {
            mut session,
            sets,
            tx_digest,
            message,
        } = session_fixture();
        session
            .add_commitment(commitment_for("party-1", &tx_digest))
            .unwrap();
        assert!(matches!(
            session.add_commitment(commitment_for("party-1", &tx_digest)),
            Err(Error::DuplicateParty(_))
        ));
        session
            .add_commitment(commitment_for("party-2", &tx_digest))
            .unwrap();

        let partial = shamir(create_shamir_partial(&sets[0], &message).unwrap());
        session.add_partial(partial.clone()).unwrap();
        assert!(matches!(
            session.add_partial(partial),
            Err(Error::DuplicateParty(_))
        ));
    }

    #[test]
    fn failed_aggregation_aborts_the_session_for_good() {
        let Fixture {
            mut session,
            sets,
            tx_digest,
            message,
        } = session_fixture();
        session
            .add_commitment(commitment_for("party-1", &tx_digest))
            .unwrap();
        session
            .add_commitment(commitment_for("party-2", &tx_digest))
            .unwrap();

        let mut corrupted = create_shamir_partial(&sets[0], &message).unwrap();
        corrupted.values[0][0] ^= 1;
        session.add_partial(shamir(corrupted)).unwrap();

        let honest = shamir(create_shamir_partial(&sets[1], &message).unwrap());
        assert!(matches!(
            session.add_partial(honest),
            Err(Error::AggregationFailed)
        ));
        assert_eq!(session.phase(), Phase::Aborted);
        assert!(session.signature().is_none());

        // nothing from the aborted session is reusable
        let retry = shamir(create_shamir_partial(&sets[2], &message).unwrap());
        assert!(matches!(
            session.add_partial(retry),
            Err(Error::SessionAborted)
        ));
    }
}
