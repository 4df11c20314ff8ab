//! JSON bodies of the key-value store API, shared by the routes and [`super::HttpStore`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub event_id: String,
    pub key: String,
    pub giver: String,
    pub recipient: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WishlistBody {
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistRecord {
    pub event_id: String,
    pub name: String,
    #[serde(default)]
    pub items: Vec<String>,
}
