//! Party-side driver for one threshold signing round-trip.
//!
//! Each party independently computes the domain-separated message from the
//! transaction digest and rotation commitment, commits to the digest,
//! waits for everyone else's commitment, and only then reveals its partial.
//! The aggregated signature is re-verified locally, so no party has to
//! trust whoever else is on the relay.

use std::time::Duration;

use tracing::{debug, info, instrument};

use lamport_ots::{PublicKey, PublicKeyHash, Signature};

use crate::aggregate::aggregate_and_verify;
use crate::config::{DigestCommitment, ThresholdConfig};
use crate::error::{Error, Result};
use crate::keygen::ShareSet;
use crate::mpc::Relay;
use crate::partial::PartialSignature;
use crate::sharing::SharingScheme;
use crate::SessionId;

/// Round number for digest commitments.
pub const ROUND_COMMIT: u32 = 1;
/// Round number for partial signature reveals.
pub const ROUND_REVEAL: u32 = 2;

/// Fresh random session identifier.
pub fn new_session_id() -> SessionId {
    rand::random()
}

/// Run the two-round signing protocol as one party.
///
/// Blocks until the session completes or `deadline` expires for a round.
/// Returns the full signature over
/// `keccak256(tx_digest || next_pkh || verifier_instance || chain_id)`.
#[instrument(skip_all, fields(party_id = %config.party_id, session_id = %hex::encode(session_id)))]
pub async fn run_signing<R: Relay>(
    config: &ThresholdConfig,
    session_id: &SessionId,
    share_set: &ShareSet,
    public_key: &PublicKey,
    tx_digest: &[u8; 32],
    next_pkh: &PublicKeyHash,
    relay: &R,
    deadline: Duration,
) -> Result<Signature> {
    let message = config.compute_message(tx_digest, next_pkh);
    let required = match share_set.scheme() {
        SharingScheme::Shamir => config.threshold,
        SharingScheme::Additive => config.parties,
    };

    // round 1: commit to the digest before revealing anything
    relay
        .broadcast(session_id, ROUND_COMMIT, &config.digest_commitment(tx_digest))
        .await?;
    let commitments: Vec<DigestCommitment> = tokio::time::timeout(
        deadline,
        relay.collect_broadcasts(session_id, ROUND_COMMIT, required),
    )
    .await
    .map_err(|_| Error::Timeout("digest commitments"))??;

    for commitment in &commitments {
        if !commitment.verify_against(tx_digest) {
            return Err(Error::DigestMismatch);
        }
    }
    debug!(count = commitments.len(), "digest commitments verified");

    // round 2: reveal this party's shares for the agreed message
    let partial = share_set.create_partial(&message)?;
    relay.broadcast(session_id, ROUND_REVEAL, &partial).await?;
    let partials: Vec<PartialSignature> = tokio::time::timeout(
        deadline,
        relay.collect_broadcasts(session_id, ROUND_REVEAL, required),
    )
    .await
    .map_err(|_| Error::Timeout("partial signatures"))??;

    let signature = aggregate_and_verify(
        &partials,
        config.threshold,
        config.parties,
        public_key,
        &message,
    )?;
    info!("signing session complete");
    Ok(signature)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rand::rngs::OsRng;

    use super::*;
    use crate::keygen::generate_shamir_key;
    use crate::mpc::MemoryRelay;
    use crate::session::{Phase, SigningSession};

    fn config_for(party_id: &str, threshold: usize, parties: usize) -> ThresholdConfig {
        ThresholdConfig::new(threshold, parties, party_id, 96369, [0x11; 20]).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn three_of_five_parties_sign_concurrently() {
        let (sets, public) = generate_shamir_key(3, 5, &mut OsRng).unwrap();
        let relay = Arc::new(MemoryRelay::new());
        let session_id = new_session_id();
        let tx_digest = lamport_ots::keccak256(b"transfer 1 wei");
        let next_pkh = [0x22u8; 32];

        let mut handles = Vec::new();
        for set in sets.into_iter().take(3) {
            let relay = Arc::clone(&relay);
            let public = public.clone();
            handles.push(tokio::spawn(async move {
                let config = config_for(&set.party_id, 3, 5);
                run_signing(
                    &config,
                    &session_id,
                    &ShareSet::Shamir(set),
                    &public,
                    &tx_digest,
                    &next_pkh,
                    relay.as_ref(),
                    Duration::from_secs(5),
                )
                .await
            }));
        }

        for handle in handles {
            let signature = handle.await.unwrap().unwrap();
            let config = config_for("checker", 3, 5);
            let message = config.compute_message(&tx_digest, &next_pkh);
            assert!(lamport_ots::verify(&public, &message, &signature));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn coordinator_session_completes_from_relay_traffic() {
        let (sets, public) = generate_shamir_key(2, 3, &mut OsRng).unwrap();
        let relay = Arc::new(MemoryRelay::new());
        let session_id = new_session_id();
        let tx_digest = lamport_ots::keccak256(b"coordinator observes the wire");
        let next_pkh = [0x77u8; 32];

        let mut handles = Vec::new();
        for set in sets.into_iter().take(2) {
            let relay = Arc::clone(&relay);
            let public = public.clone();
            handles.push(tokio::spawn(async move {
                let config = config_for(&set.party_id, 2, 3);
                run_signing(
                    &config,
                    &session_id,
                    &ShareSet::Shamir(set),
                    &public,
                    &tx_digest,
                    &next_pkh,
                    relay.as_ref(),
                    Duration::from_secs(5),
                )
                .await
            }));
        }

        // a separate coordinator replays the same wire messages through the
        // session state machine
        let config = config_for("coordinator", 2, 3);
        let mut session = SigningSession::new(
            config.clone(),
            SharingScheme::Shamir,
            public.clone(),
            tx_digest,
            next_pkh,
        );
        let commitments: Vec<DigestCommitment> = relay
            .collect_broadcasts(&session_id, ROUND_COMMIT, 2)
            .await
            .unwrap();
        for commitment in commitments {
            session.add_commitment(commitment).unwrap();
        }
        let partials: Vec<PartialSignature> = relay
            .collect_broadcasts(&session_id, ROUND_REVEAL, 2)
            .await
            .unwrap();
        for partial in partials {
            session.add_partial(partial).unwrap();
        }

        assert_eq!(session.phase(), Phase::Complete);
        let message = config.compute_message(&tx_digest, &next_pkh);
        assert!(lamport_ots::verify(
            &public,
            &message,
            session.signature().unwrap()
        ));

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }

    #[tokio::test]
    async fn missing_parties_time_the_round_out() {
        let (sets, public) = generate_shamir_key(2, 3, &mut OsRng).unwrap();
        let relay = MemoryRelay::new();
        let session_id = new_session_id();
        let set = sets.into_iter().next().unwrap();
        let config = config_for(&set.party_id, 2, 3);

        let result = run_signing(
            &config,
            &session_id,
            &ShareSet::Shamir(set),
            &public,
            &lamport_ots::keccak256(b"nobody else shows up"),
            &[0u8; 32],
            &relay,
            Duration::from_millis(200),
        )
        .await;
        assert!(matches!(result, Err(Error::Timeout("digest commitments"))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn party_with_wrong_digest_is_caught() {
        let (sets, public) = generate_shamir_key(2, 2, &mut OsRng).unwrap();
        let relay = Arc::new(MemoryRelay::new());
        let session_id = new_session_id();
        let tx_digest = lamport_ots::keccak256(b"agreed digest");
        let rogue_digest = lamport_ots::keccak256(b"rogue digest");
        let next_pkh = [0u8; 32];

        let mut sets = sets.into_iter();
        let honest = sets.next().unwrap();
        let rogue = sets.next().unwrap();

        let rogue_handle = {
            let relay = Arc::clone(&relay);
            let public = public.clone();
            tokio::spawn(async move {
                let config = config_for(&rogue.party_id, 2, 2);
                run_signing(
                    &config,
                    &session_id,
                    &ShareSet::Shamir(rogue),
                    &public,
                    &rogue_digest,
                    &next_pkh,
                    relay.as_ref(),
                    Duration::from_secs(5),
                )
                .await
            })
        };

        let config = config_for(&honest.party_id, 2, 2);
        let result = run_signing(
            &config,
            &session_id,
            &ShareSet::Shamir(honest),
            &public,
            &tx_digest,
            &next_pkh,
            relay.as_ref(),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(Error::DigestMismatch)));
        assert!(rogue_handle.await.unwrap().is_err());
    }
}
