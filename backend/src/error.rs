use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use santa_core::{LinkError, PairingError, ValidationError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    PairingFailed(#[from] PairingError),
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("Failed to save pairs: {0}")]
    PublishFailed(StoreError),
    #[error("Could not save wishlist: {0}")]
    WishlistSaveFailed(StoreError),
    #[error("Could not load your assignment.")]
    AssignmentNotFound,
    #[error("Invalid input: {0}")]
    BadRequest(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl AppError {
    /// Lookups share one mapping: an unknown token is "not found", anything else is a
    /// store problem.
    pub fn from_lookup(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::AssignmentNotFound,
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::PairingFailed(e) => {
                warn!("pairing failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not generate pairs. Try again.".to_string(),
                )
            }
            AppError::Link(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::PublishFailed(e) => {
                error!("publishing pairs failed: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Failed to save pairs. Please try again.".to_string(),
                )
            }
            AppError::WishlistSaveFailed(e) => {
                error!("wishlist save failed: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Could not save. Please try again.".to_string(),
                )
            }
            AppError::AssignmentNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Store(e) => {
                error!("store error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is unavailable. Try again later.".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
