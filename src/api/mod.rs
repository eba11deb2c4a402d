//! HTTP surface for the shared pet.
//!
//! ## Endpoints
//!
//! - `GET  /`              - Liveness message
//! - `GET  /pet/config`    - Sprite paths, sprite size and frame rate
//! - `GET  /pet/state`     - Current pet state
//! - `POST /pet/position`  - Drag the pet to `{x, y}`
//! - `POST /pet/grab`      - Grab or release with `{grabbed}`
//! - `POST /pet/init`      - Reset onto a `{canvas_width, canvas_height}` canvas
//! - `GET  /pet/events`    - SSE stream: `pet_state` on connect, then `pet_update`

pub mod error;

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tower_http::cors::{Any, CorsLayer};

use self::error::ApiError;
use crate::driver::{BroadcastPublisher, Publisher};
use crate::pet::animation::{Animation, FRAME_DURATION};
use crate::pet::{canvas_fits, PetSnapshot, SharedPet, SPRITE_SIZE};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pet: SharedPet,
    pub updates: BroadcastPublisher,
    pub sprite_root: Arc<str>,
}

impl AppState {
    pub fn new(pet: SharedPet, updates: BroadcastPublisher, sprite_root: &str) -> Self {
        Self {
            pet,
            updates,
            sprite_root: Arc::from(sprite_root),
        }
    }

    /// Push a command's result out right away instead of waiting for the next tick.
    fn announce(&self, snapshot: &PetSnapshot) {
        if let Err(e) = self.updates.publish(snapshot) {
            log::warn!("Pet update failed: {e}");
        }
    }
}

// ── Request/Response Types ───────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Deserialize)]
pub struct GrabRequest {
    pub grabbed: bool,
}

#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub canvas_width: u32,
    pub canvas_height: u32,
}

#[derive(Debug, Serialize)]
pub struct SpriteSize {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize)]
pub struct PetConfigResponse {
    pub animations: BTreeMap<&'static str, String>,
    pub default_size: SpriteSize,
    /// Milliseconds per animation frame.
    pub frame_rate: u32,
}

// ── Router ───────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/pet/config", get(get_config))
        .route("/pet/state", get(get_state))
        .route("/pet/position", post(set_position))
        .route("/pet/grab", post(grab))
        .route("/pet/init", post(init))
        .route("/pet/events", get(events))
        .layer(cors)
        .with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────

async fn root() -> Json<Value> {
    Json(json!({ "message": "pet simulation service" }))
}

/// GET /pet/config
async fn get_config(State(state): State<AppState>) -> Json<PetConfigResponse> {
    let animations = Animation::ALL
        .iter()
        .map(|anim| {
            let path = format!("{}/{}", state.sprite_root, anim.sprite_file());
            (anim.label(), path)
        })
        .collect();

    Json(PetConfigResponse {
        animations,
        default_size: SpriteSize {
            width: SPRITE_SIZE,
            height: SPRITE_SIZE,
        },
        frame_rate: (FRAME_DURATION * 1000.0).round() as u32,
    })
}

/// GET /pet/state
async fn get_state(State(state): State<AppState>) -> Json<PetSnapshot> {
    Json(state.pet.snapshot())
}

/// POST /pet/position
async fn set_position(
    State(state): State<AppState>,
    Json(req): Json<MoveRequest>,
) -> Json<PetSnapshot> {
    let snapshot = state.pet.with(|engine| {
        engine.set_position(req.x, req.y);
        engine.snapshot()
    });
    log::debug!("Pet moved to ({:.1}, {:.1})", req.x, req.y);
    state.announce(&snapshot);
    Json(snapshot)
}

/// POST /pet/grab
async fn grab(State(state): State<AppState>, Json(req): Json<GrabRequest>) -> Json<PetSnapshot> {
    let snapshot = state.pet.with(|engine| {
        engine.set_grabbed(req.grabbed);
        engine.snapshot()
    });
    log::info!(
        "Pet {} at ({:.1}, {:.1}) -> {}",
        if req.grabbed { "grabbed" } else { "released" },
        snapshot.x,
        snapshot.y,
        snapshot.animation.label(),
    );
    state.announce(&snapshot);
    Json(snapshot)
}

/// POST /pet/init
async fn init(
    State(state): State<AppState>,
    Json(req): Json<InitRequest>,
) -> Result<Json<Value>, ApiError> {
    if !canvas_fits(req.canvas_width, req.canvas_height) {
        return Err(ApiError::CanvasTooSmall {
            width: req.canvas_width,
            height: req.canvas_height,
            sprite: SPRITE_SIZE,
        });
    }

    let snapshot = state.pet.with(|engine| {
        engine.reconfigure(req.canvas_width, req.canvas_height);
        engine.snapshot()
    });
    log::info!(
        "Pet reset onto {}x{} canvas",
        req.canvas_width,
        req.canvas_height
    );
    state.announce(&snapshot);
    Ok(Json(json!({ "status": "initialized" })))
}

/// GET /pet/events (SSE)
async fn events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.updates.subscribe();
    let current = serde_json::to_string(&state.pet.snapshot()).unwrap_or_default();

    let greeting = tokio_stream::once(Ok::<_, Infallible>(
        Event::default().event("pet_state").data(current),
    ));
    let updates = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(json) => Some(Ok(Event::default().event("pet_update").data(json))),
        Err(_) => None, // Lagged: skip missed updates
    });

    Sse::new(greeting.chain(updates)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::pet::PetEngine;

    fn app_state() -> AppState {
        AppState::new(
            SharedPet::new(PetEngine::new(800, 600)),
            BroadcastPublisher::new(),
            "/static/sprites/cat",
        )
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = router(state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn state_starts_on_the_floor() {
        let state = app_state();
        let (status, body) = send(&state, "GET", "/pet/state", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["x"], 100.0);
        assert_eq!(body["y"], 500.0);
        assert_eq!(body["animation"], "idle");
        assert_eq!(body["frame"], 0);
        assert_eq!(body["is_grabbed"], false);
    }

    #[tokio::test]
    async fn drag_and_drop_flow() {
        let state = app_state();
        let mut rx = state.updates.subscribe();

        let (_, body) = send(&state, "POST", "/pet/grab", Some(json!({ "grabbed": true }))).await;
        assert_eq!(body["animation"], "grabbed");
        assert_eq!(body["is_grabbed"], true);

        let (_, body) = send(
            &state,
            "POST",
            "/pet/position",
            Some(json!({ "x": 320.0, "y": 140.0 })),
        )
        .await;
        assert_eq!(body["x"], 320.0);
        assert_eq!(body["y"], 140.0);
        assert_eq!(body["animation"], "grabbed");

        let (_, body) = send(&state, "POST", "/pet/grab", Some(json!({ "grabbed": false }))).await;
        assert_eq!(body["animation"], "falling");
        assert_eq!(body["is_grabbed"], false);

        // Every command was announced.
        for expected in ["grabbed", "grabbed", "falling"] {
            let update: Value = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
            assert_eq!(update["animation"], expected);
        }
    }

    #[tokio::test]
    async fn init_resets_onto_new_canvas() {
        let state = app_state();
        send(&state, "POST", "/pet/position", Some(json!({ "x": 5.0, "y": 5.0 }))).await;

        let (status, body) = send(
            &state,
            "POST",
            "/pet/init",
            Some(json!({ "canvas_width": 1280, "canvas_height": 720 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "initialized");

        let (_, body) = send(&state, "GET", "/pet/state", None).await;
        assert_eq!(body["x"], 100.0);
        assert_eq!(body["y"], 620.0);
    }

    #[tokio::test]
    async fn init_rejects_canvas_smaller_than_the_pet() {
        let state = app_state();
        let (status, body) = send(
            &state,
            "POST",
            "/pet/init",
            Some(json!({ "canvas_width": 640, "canvas_height": 40 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("640x40"));

        // Pet untouched.
        let (_, body) = send(&state, "GET", "/pet/state", None).await;
        assert_eq!(body["y"], 500.0);
    }

    #[tokio::test]
    async fn malformed_commands_are_rejected() {
        let state = app_state();
        let (status, _) = send(&state, "POST", "/pet/position", Some(json!({ "x": "left" }))).await;
        assert!(status.is_client_error());

        let (status, _) = send(&state, "POST", "/pet/grab", Some(json!({}))).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn config_lists_every_animation() {
        let state = app_state();
        let (status, body) = send(&state, "GET", "/pet/config", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["frame_rate"], 100);
        assert_eq!(body["default_size"]["width"], 100);
        let animations = body["animations"].as_object().unwrap();
        assert_eq!(animations.len(), Animation::ALL.len());
        assert_eq!(animations["walk_left"], "/static/sprites/cat/walking_negative.gif");
        assert_eq!(animations["idle_to_sleep"], "/static/sprites/cat/idle_to_sleep.gif");
    }

    #[tokio::test]
    async fn event_stream_opens_with_current_state() {
        let state = app_state();
        let response = router(state.clone())
            .oneshot(Request::get("/pet/events").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );

        let mut stream = response.into_body().into_data_stream();
        let first = stream.next().await.unwrap().unwrap();
        let text = String::from_utf8(first.to_vec()).unwrap();
        assert!(text.contains("event: pet_state"), "{text}");
        assert!(text.contains("\"animation\":\"idle\""), "{text}");
    }
}
