//! Party-to-party message transport for threshold signing.

use serde::{de::DeserializeOwned, Serialize};

use crate::{Result, SessionId};

pub use ::async_trait::async_trait;

/// Message relay between signing parties.
///
/// Both protocol rounds are broadcasts: digest commitments in round 1 and
/// partial signatures in round 2. Implementations only have to provide
/// at-least-once broadcast delivery keyed by session and round.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Broadcast a message to all parties in the session.
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()>;

    /// Collect `count` broadcast messages for the given round, waiting
    /// until they have all arrived.
    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
    ) -> Result<Vec<T>>;
}

/// In-memory relay for testing
pub mod memory;

pub use memory::MemoryRelay;
