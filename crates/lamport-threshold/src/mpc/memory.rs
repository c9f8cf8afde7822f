//! In-memory relay implementation for testing

use std::sync::Arc;

use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;

use super::{async_trait, Relay};
use crate::{Result, SessionId};

/// In-memory message relay for local testing and single-process setups.
pub struct MemoryRelay {
    /// Broadcast messages: (session_id, round) -> Vec<message_bytes>
    broadcasts: Arc<DashMap<(SessionId, u32), Vec<Vec<u8>>>>,
    /// Notification channel
    notify: broadcast::Sender<()>,
}

impl MemoryRelay {
    pub fn new() -> Self {
        let (notify, _) = broadcast::channel(100);
        Self {
            broadcasts: Arc::new(DashMap::new()),
            notify,
        }
    }
}

impl Default for MemoryRelay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Relay for MemoryRelay {
    async fn broadcast<T: Serialize + Send + Sync>(
        &self,
        session_id: &SessionId,
        round: u32,
        message: &T,
    ) -> Result<()> {
        let bytes = serde_json::to_vec(message)?;

        self.broadcasts
            .entry((*session_id, round))
            .or_default()
            .push(bytes);

        let _ = self.notify.send(());
        Ok(())
    }

    async fn collect_broadcasts<T: DeserializeOwned + Send>(
        &self,
        session_id: &SessionId,
        round: u32,
        count: usize,
    ) -> Result<Vec<T>> {
        let mut rx = self.notify.subscribe();

        loop {
            if let Some(messages) = self.broadcasts.get(&(*session_id, round)) {
                if messages.len() >= count {
                    return messages
                        .iter()
                        .take(count)
                        .map(|bytes| serde_json::from_slice(bytes).map_err(Into::into))
                        .collect();
                }
            }

            // Wait for notification with timeout
            tokio::select! {
                _ = rx.recv() => continue,
                _ = tokio::time::sleep(std::time::Duration::from_millis(100)) => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Reveal {
        party: String,
        seq: u32,
    }

    fn reveal(party: &str, seq: u32) -> Reveal {
        Reveal {
            party: party.to_string(),
            seq,
        }
    }

    #[tokio::test]
    async fn broadcasts_are_collected_in_arrival_order() {
        let relay = MemoryRelay::new();
        let session_id = [0u8; 32];

        relay.broadcast(&session_id, 1, &reveal("party-1", 7)).await.unwrap();
        relay.broadcast(&session_id, 1, &reveal("party-2", 8)).await.unwrap();

        let collected: Vec<Reveal> = relay.collect_broadcasts(&session_id, 1, 2).await.unwrap();
        assert_eq!(collected, vec![reveal("party-1", 7), reveal("party-2", 8)]);
    }

    #[tokio::test]
    async fn collect_blocks_until_the_count_arrives() {
        let relay = std::sync::Arc::new(MemoryRelay::new());
        let session_id = [2u8; 32];

        let collector = {
            let relay = std::sync::Arc::clone(&relay);
            tokio::spawn(async move {
                relay
                    .collect_broadcasts::<Reveal>(&session_id, 1, 2)
                    .await
                    .unwrap()
            })
        };

        relay.broadcast(&session_id, 1, &reveal("party-1", 1)).await.unwrap();
        relay.broadcast(&session_id, 1, &reveal("party-2", 2)).await.unwrap();
        assert_eq!(collector.await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rounds_are_isolated() {
        let relay = MemoryRelay::new();
        let session_id = [1u8; 32];

        relay.broadcast(&session_id, 1, &reveal("party-1", 1)).await.unwrap();
        relay.broadcast(&session_id, 2, &reveal("party-1", 2)).await.unwrap();

        let round_two: Vec<Reveal> = relay.collect_broadcasts(&session_id, 2, 1).await.unwrap();
        assert_eq!(round_two, vec![reveal("party-1", 2)]);
    }
}
