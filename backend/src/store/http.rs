use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use santa_core::{cap_wishlist, Assignment};
use tracing::debug;
use url::Url;

use super::wire::{PairRecord, WishlistBody, WishlistRecord};
use super::{SantaStore, StoreError};

/// Talks to a remote key-value backend over the `/api/pair` and `/api/wishlist` routes.
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
}

impl HttpStore {
    pub fn new(base: Url) -> Self {
        Self::with_client(Client::new(), base)
    }

    pub fn with_client(client: Client, base: Url) -> Self {
        Self { client, base }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Unavailable(format!("{} cannot be a base url", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn unavailable(err: reqwest::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

#[async_trait]
impl SantaStore for HttpStore {
    async fn create_pair_token(
        &self,
        event_id: &str,
        token: &str,
        assignment: &Assignment,
    ) -> Result<(), StoreError> {
        let body = PairRecord {
            event_id: event_id.to_string(),
            key: token.to_string(),
            giver: assignment.giver.clone(),
            recipient: assignment.recipient.clone(),
        };
        let res = self
            .client
            .post(self.endpoint(&["api", "pair"])?)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        if !res.status().is_success() {
            return Err(StoreError::Rejected(format!(
                "saving pair returned {}",
                res.status()
            )));
        }
        Ok(())
    }

    async fn resolve_pair_token(
        &self,
        event_id: &str,
        token: &str,
    ) -> Result<Assignment, StoreError> {
        let res = self
            .client
            .get(self.endpoint(&["api", "pair", event_id, token])?)
            .send()
            .await
            .map_err(unavailable)?;

        match res.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound),
            status if status.is_success() => res
                .json::<Assignment>()
                .await
                .map_err(|e| StoreError::Rejected(format!("malformed pair body: {e}"))),
            status => Err(StoreError::Rejected(format!("fetching pair returned {status}"))),
        }
    }

    async fn load_wishlist(
        &self,
        event_id: &str,
        participant: &str,
    ) -> Result<Vec<String>, StoreError> {
        let res = self
            .client
            .get(self.endpoint(&["api", "wishlist", event_id, participant])?)
            .send()
            .await
            .map_err(unavailable)?;

        if !res.status().is_success() {
            debug!(status = %res.status(), "no wishlist record");
            return Ok(Vec::new());
        }
        let body = res.json::<WishlistBody>().await.unwrap_or_default();
        Ok(cap_wishlist(body.items))
    }

    async fn save_wishlist(
        &self,
        event_id: &str,
        participant: &str,
        items: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let items = cap_wishlist(items);
        let body = WishlistRecord {
            event_id: event_id.to_string(),
            name: participant.to_string(),
            items: items.clone(),
        };
        let res = self
            .client
            .post(self.endpoint(&["api", "wishlist"])?)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;

        if !res.status().is_success() {
            return Err(StoreError::Rejected(format!(
                "saving wishlist returned {}",
                res.status()
            )));
        }
        Ok(items)
    }
}
