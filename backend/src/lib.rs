use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use santa_core::{cap_wishlist, Assignment, RosterFormat};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod service;
pub mod store;

use config::Config;
use error::AppError;
use service::SantaService;
use store::wire::{PairRecord, WishlistBody, WishlistRecord};
use store::{HttpStore, MemoryStore, SantaStore, StoreError};

pub use santa_core::LinkBuilder;

#[derive(Clone)]
pub struct AppState {
    service: SantaService,
}

impl AppState {
    pub fn new(store: Arc<dyn SantaStore>, links: LinkBuilder) -> Self {
        Self {
            service: SantaService::new(store, links),
        }
    }

    pub async fn from_config(config: &Config) -> Self {
        let store: Arc<dyn SantaStore> = match (&config.store_url, &config.persist_path) {
            (Some(url), _) => {
                info!(store = %url, "using remote store");
                Arc::new(HttpStore::new(url.clone()))
            }
            (None, Some(path)) => {
                info!(path = %path.display(), "using file-backed store");
                Arc::new(MemoryStore::with_persistence(path.clone()).await)
            }
            (None, None) => {
                info!("using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };
        Self::new(store, config.links.clone())
    }

    pub fn service(&self) -> &SantaService {
        &self.service
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/pair", post(create_pair))
        .route("/api/pair/:event/:key", get(get_pair))
        .route("/api/wishlist", post(save_wishlist))
        .route("/api/wishlist/:event/:name", get(get_wishlist))
        .route("/events", post(create_event))
        .route("/events/:event/pairs/:key", get(get_assignment))
        .route("/events/:event/pairs/:key/wishlist", put(update_own_wishlist))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn create_pair(
    State(state): State<AppState>,
    Json(payload): Json<PairRecord>,
) -> Result<impl IntoResponse, AppError> {
    let giver = payload.giver.trim();
    let recipient = payload.recipient.trim();
    if payload.event_id.is_empty() || payload.key.is_empty() {
        return Err(AppError::BadRequest("eventId and key required".into()));
    }
    if giver.is_empty() || recipient.is_empty() {
        return Err(AppError::BadRequest("giver and recipient required".into()));
    }
    if giver == recipient {
        return Err(AppError::BadRequest("giver cannot draw themselves".into()));
    }

    let assignment = Assignment {
        giver: giver.to_string(),
        recipient: recipient.to_string(),
    };
    state
        .service
        .store()
        .create_pair_token(&payload.event_id, &payload.key, &assignment)
        .await
        .map_err(|err| match err {
            StoreError::Rejected(msg) => AppError::Conflict(msg),
            other => AppError::Store(other),
        })?;

    Ok(StatusCode::CREATED)
}

async fn get_pair(
    State(state): State<AppState>,
    Path((event_id, key)): Path<(String, String)>,
) -> Result<Json<Assignment>, AppError> {
    let assignment = state
        .service
        .store()
        .resolve_pair_token(&event_id, &key)
        .await
        .map_err(AppError::from_lookup)?;
    Ok(Json(assignment))
}

async fn get_wishlist(
    State(state): State<AppState>,
    Path((event_id, name)): Path<(String, String)>,
) -> Json<WishlistBody> {
    let items = state.service.load_wishlist(&event_id, &name).await;
    Json(WishlistBody { items })
}

async fn save_wishlist(
    State(state): State<AppState>,
    Json(payload): Json<WishlistRecord>,
) -> Result<Json<WishlistBody>, AppError> {
    if payload.event_id.is_empty() || payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("eventId and name required".into()));
    }
    let items = state
        .service
        .store()
        .save_wishlist(&payload.event_id, &payload.name, &cap_wishlist(&payload.items))
        .await
        .map_err(AppError::WishlistSaveFailed)?;
    Ok(Json(WishlistBody { items }))
}

#[derive(Deserialize)]
struct CreateEventRequest {
    participants: String,
    #[serde(default)]
    require_email: bool,
}

#[derive(Deserialize)]
struct CreateEventParams {
    seed: Option<u64>,
}

async fn create_event(
    State(state): State<AppState>,
    Query(params): Query<CreateEventParams>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let format = if payload.require_email {
        RosterFormat::NameAndEmail
    } else {
        RosterFormat::NamesOnly
    };
    let page = state
        .service
        .create_event(&payload.participants, format, params.seed)
        .await?;
    Ok((StatusCode::CREATED, Json(page)))
}

async fn get_assignment(
    State(state): State<AppState>,
    Path((event_id, key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.service.open_assignment(&event_id, &key).await?;
    Ok(Json(state.service.assignment_view(&session).await))
}

#[derive(Deserialize)]
struct WishlistUpdate {
    #[serde(default)]
    items: Vec<String>,
}

async fn update_own_wishlist(
    State(state): State<AppState>,
    Path((event_id, key)): Path<(String, String)>,
    Json(payload): Json<WishlistUpdate>,
) -> Result<Json<WishlistBody>, AppError> {
    let session = state.service.open_assignment(&event_id, &key).await?;
    let items = state.service.save_wishlist(&session, &payload.items).await?;
    Ok(Json(WishlistBody { items }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use santa_core::generate_pairing_seeded;
    use serde_json::json;
    use tower::ServiceExt;

    async fn json_body(res: axum::response::Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn test_app() -> (Router, MemoryStore) {
        let store = MemoryStore::new();
        let links = LinkBuilder::new("https://santa.example/").unwrap();
        let state = AppState::new(Arc::new(store.clone()), links);
        (app(state), store)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn key_from(url: &str) -> String {
        santa_core::ParticipantLink::parse(url).unwrap().token
    }

    #[tokio::test]
    async fn pair_api_round_trip_and_not_found() {
        let (app, _) = test_app();
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/pair",
                json!({ "eventId": "ev1", "key": "k1", "giver": "Alice", "recipient": "Bob" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app.clone().oneshot(get("/api/pair/ev1/k1")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body, json!({ "giver": "Alice", "recipient": "Bob" }));

        let res = app.clone().oneshot(get("/api/pair/ev1/unknown")).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = json_body(res).await;
        assert_eq!(body["error"], "Could not load your assignment.");
    }

    #[tokio::test]
    async fn pair_api_rejects_duplicates_and_self_pairs() {
        let (app, _) = test_app();
        let record = json!({ "eventId": "ev1", "key": "k1", "giver": "Alice", "recipient": "Bob" });
        let res = app
            .clone()
            .oneshot(post_json("/api/pair", record.clone()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app.clone().oneshot(post_json("/api/pair", record)).await.unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = app
            .clone()
            .oneshot(post_json(
                "/api/pair",
                json!({ "eventId": "ev1", "key": "k2", "giver": "Alice", "recipient": "Alice" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wishlist_api_caps_and_defaults_to_empty() {
        let (app, _) = test_app();
        let res = app.clone().oneshot(get("/api/wishlist/ev1/Alice")).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({ "items": [] }));

        let items = (1..=7).map(|i| format!("gift {i}")).collect::<Vec<_>>();
        let res = app
            .clone()
            .oneshot(post_json(
                "/api/wishlist",
                json!({ "eventId": "ev1", "name": "Alice", "items": items }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = app.clone().oneshot(get("/api/wishlist/ev1/Alice")).await.unwrap();
        let body = json_body(res).await;
        assert_eq!(body["items"], json!(items[..5]));
    }

    #[tokio::test]
    async fn create_event_returns_sorted_share_page() {
        let (app, store) = test_app();
        let res = app
            .clone()
            .oneshot(post_json(
                "/events",
                json!({ "participants": "Carol\nAlice\n\nBob\n" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let page = json_body(res).await;

        let event_id = page["event_id"].as_str().unwrap();
        assert_eq!(event_id.len(), santa_core::EVENT_ID_LEN);
        assert_eq!(
            page["results_url"],
            format!("https://santa.example/results.html?event={event_id}")
        );

        let links = page["links"].as_array().unwrap();
        let givers = links
            .iter()
            .map(|l| l["giver"].as_str().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(givers, vec!["Alice", "Bob", "Carol"]);

        for link in links {
            let key = key_from(link["url"].as_str().unwrap());
            let assignment = store.resolve_pair_token(event_id, &key).await.unwrap();
            assert_eq!(assignment.giver, link["giver"].as_str().unwrap());
            assert_ne!(assignment.giver, assignment.recipient);
        }
    }

    #[tokio::test]
    async fn create_event_with_seed_is_deterministic() {
        let (app, store) = test_app();
        let res = app
            .clone()
            .oneshot(post_json(
                "/events?seed=42",
                json!({ "participants": "Alice\nBob\nCarol\nDave\nErin" }),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let page = json_body(res).await;
        let event_id = page["event_id"].as_str().unwrap();

        let names = ["Alice", "Bob", "Carol", "Dave", "Erin"]
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>();
        let expected = generate_pairing_seeded(&names, 42).unwrap();

        for link in page["links"].as_array().unwrap() {
            let key = key_from(link["url"].as_str().unwrap());
            let assignment = store.resolve_pair_token(event_id, &key).await.unwrap();
            let want = expected
                .iter()
                .find(|p| p.from == assignment.giver)
                .unwrap();
            assert_eq!(assignment.recipient, want.to);
        }
    }

    #[tokio::test]
    async fn create_event_validation_errors_are_bad_requests() {
        let (app, _) = test_app();
        for (participants, require_email, message) in [
            ("Alice", false, "Please enter at least 2 participants."),
            ("Alice\nalice", false, "Duplicate names detected (alice). Names must be unique."),
            ("Alice, a@x.io\nBob", true, "Line 2 is missing an email address."),
        ] {
            let res = app
                .clone()
                .oneshot(post_json(
                    "/events",
                    json!({ "participants": participants, "require_email": require_email }),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(json_body(res).await["error"], message);
        }
    }

    #[tokio::test]
    async fn participant_flow_reads_assignment_and_saves_own_wishlist() {
        let (app, _) = test_app();
        let page = json_body(
            app.clone()
                .oneshot(post_json("/events", json!({ "participants": "Alice\nBob" })))
                .await
                .unwrap(),
        )
        .await;
        let event_id = page["event_id"].as_str().unwrap();
        let alice_key = key_from(page["links"][0]["url"].as_str().unwrap());
        let bob_key = key_from(page["links"][1]["url"].as_str().unwrap());

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/events/{event_id}/pairs/{bob_key}/wishlist"))
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "items": ["  scarf ", "", "tea"] }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, json!({ "items": ["scarf", "tea"] }));

        let res = app
            .clone()
            .oneshot(get(&format!("/events/{event_id}/pairs/{alice_key}")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let view = json_body(res).await;
        assert_eq!(view["giver"], "Alice");
        assert_eq!(view["recipient"], "Bob");
        assert_eq!(view["wishlist"], json!([]));
        assert_eq!(view["recipient_wishlist"], json!(["scarf", "tea"]));

        let res = app
            .clone()
            .oneshot(get(&format!("/events/{event_id}/pairs/not-a-key")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri(format!("/events/{event_id}/pairs/not-a-key/wishlist"))
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "items": ["x"] }).to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_event_reports_store_failure() {
        let path = std::env::temp_dir()
            .join(format!("santa_missing_{}", uuid::Uuid::new_v4()))
            .join("state.json");
        let store = MemoryStore::with_persistence(path).await;
        let links = LinkBuilder::new("https://santa.example/").unwrap();
        let app = app(AppState::new(Arc::new(store), links));

        let res = app
            .oneshot(post_json("/events", json!({ "participants": "Alice\nBob" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(res).await;
        assert!(body.get("links").is_none());
        assert_eq!(body["error"], "Failed to save pairs. Please try again.");
    }
}
