use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use santa_core::{cap_wishlist, AccessToken, Assignment, EventId, ParticipantName};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{SantaStore, StoreError};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    pairs: HashMap<EventId, HashMap<AccessToken, Assignment>>,
    #[serde(default)]
    wishlists: HashMap<EventId, HashMap<ParticipantName, Vec<String>>>,
}

/// In-process store, optionally mirrored to a JSON file after every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Snapshot>>,
    persist_path: Option<PathBuf>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the snapshot at `path` if there is one. A missing file starts empty; an
    /// unreadable one is logged and also starts empty.
    pub async fn with_persistence(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut snapshot = Snapshot::default();
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(saved) => snapshot = saved,
                Err(err) => warn!(path = %path.display(), %err, "ignoring unreadable snapshot"),
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot yet");
            }
            Err(err) => warn!(path = %path.display(), %err, "could not read snapshot"),
        }

        Self {
            data: Arc::new(RwLock::new(snapshot)),
            persist_path: Some(path),
        }
    }

    async fn persist(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(snapshot)
            .map_err(|e| StoreError::Unavailable(format!("encode snapshot: {e}")))?;
        tokio::fs::write(path, json).await.map_err(|e| {
            warn!(path = %path.display(), %e, "persist error");
            StoreError::Unavailable(format!("write snapshot: {e}"))
        })
    }
}

#[async_trait]
impl SantaStore for MemoryStore {
    async fn create_pair_token(
        &self,
        event_id: &str,
        token: &str,
        assignment: &Assignment,
    ) -> Result<(), StoreError> {
        // The lock is held across the file write so snapshots land in order.
        let mut data = self.data.write().await;
        let event = data.pairs.entry(event_id.to_string()).or_default();
        if event.contains_key(token) {
            return Err(StoreError::Rejected(format!(
                "pair key {token} already exists for event {event_id}"
            )));
        }
        event.insert(token.to_string(), assignment.clone());

        if let Err(err) = self.persist(&data).await {
            if let Some(event) = data.pairs.get_mut(event_id) {
                event.remove(token);
                if event.is_empty() {
                    data.pairs.remove(event_id);
                }
            }
            return Err(err);
        }
        Ok(())
    }

    async fn resolve_pair_token(
        &self,
        event_id: &str,
        token: &str,
    ) -> Result<Assignment, StoreError> {
        let data = self.data.read().await;
        data.pairs
            .get(event_id)
            .and_then(|event| event.get(token))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn load_wishlist(
        &self,
        event_id: &str,
        participant: &str,
    ) -> Result<Vec<String>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .wishlists
            .get(event_id)
            .and_then(|event| event.get(participant))
            .cloned()
            .unwrap_or_default())
    }

    async fn save_wishlist(
        &self,
        event_id: &str,
        participant: &str,
        items: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let items = cap_wishlist(items);
        let mut data = self.data.write().await;
        let previous = data
            .wishlists
            .entry(event_id.to_string())
            .or_default()
            .insert(participant.to_string(), items.clone());

        if let Err(err) = self.persist(&data).await {
            if let Some(event) = data.wishlists.get_mut(event_id) {
                match previous {
                    Some(previous) => {
                        event.insert(participant.to_string(), previous);
                    }
                    None => {
                        event.remove(participant);
                    }
                }
            }
            return Err(err);
        }
        Ok(items)
    }
}
