use async_trait::async_trait;
use santa_core::Assignment;
use thiserror::Error;

pub mod http;
pub mod memory;
pub mod wire;

pub use http::HttpStore;
pub use memory::MemoryStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected the request: {0}")]
    Rejected(String),
}

/// Key-value storage for pair tokens and wishlists.
///
/// Pair records are keyed by (event, token) and written once. Wishlists are keyed by
/// (event, participant name) and overwritten on every save.
#[async_trait]
pub trait SantaStore: Send + Sync {
    async fn create_pair_token(
        &self,
        event_id: &str,
        token: &str,
        assignment: &Assignment,
    ) -> Result<(), StoreError>;

    /// Unknown (event, token) pairs yield [`StoreError::NotFound`].
    async fn resolve_pair_token(&self, event_id: &str, token: &str)
        -> Result<Assignment, StoreError>;

    /// A participant without a saved wishlist has an empty one.
    async fn load_wishlist(&self, event_id: &str, participant: &str)
        -> Result<Vec<String>, StoreError>;

    /// Caps `items` and returns what was actually stored.
    async fn save_wishlist(
        &self,
        event_id: &str,
        participant: &str,
        items: &[String],
    ) -> Result<Vec<String>, StoreError>;
}
