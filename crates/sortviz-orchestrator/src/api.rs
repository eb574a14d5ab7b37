//! HTTP API endpoints for the visualizer.
//!
//! This module provides the REST API the UI uses to drive playback, plus the
//! `/ws` event stream.
//!
//! # Endpoints
//!
//! - `GET /api/state` - Current playback snapshot
//! - `GET /api/algorithms` - Algorithm catalogue
//! - `POST /api/play`, `/api/pause`, `/api/stop`, `/api/reset` - Playback controls
//! - `POST /api/shuffle` - Show a random array
//! - `POST /api/speed` - Change the delay between steps
//! - `POST /api/algorithm` - Select the algorithm
//! - `POST /api/override` - Submit a visualizer update
//! - `POST /api/tutor/message` - Send a learner message to the tutor
//! - `POST /api/tutor/hint` - Next hint from the local hint ladder
//! - `GET /ws` - WebSocket event stream
//!
//! # Example
//!
//! ```no_run
//! use sortviz_orchestrator::{create_router, AppState, Config, Driver};
//!
//! # async fn example() {
//! let driver = Driver::new(&Config::default());
//! let router = create_router(AppState::new(driver));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sortviz_engine::{Algorithm, AlgorithmInfo};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::driver::Driver;
use crate::error::SortvizError;
use crate::playback::{OverrideOutcome, PlaybackSnapshot};
use crate::shuffle::ShuffleRequest;
use crate::tutor::{TutorExchange, TutorHint, TutorSession};
use crate::visualizer::VisualizerUpdate;
use crate::websocket::{ws_handler, WsState};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the speed endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpeedRequest {
    /// Delay between steps in milliseconds.
    pub ms: u64,
}

/// Request body for the algorithm endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmRequest {
    /// Algorithm id, e.g. `quickSort`.
    pub algorithm: String,
}

/// Response body for the override endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideResponse {
    /// What happened to the update.
    pub outcome: OverrideOutcome,
    /// Playback state after the update.
    pub snapshot: PlaybackSnapshot,
}

/// Request body for the tutor endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorMessageRequest {
    /// The learner's message.
    pub message: String,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The playback driver.
    pub driver: Driver,
    /// The tutor session, when a tutor is configured.
    pub tutor: Option<Arc<TutorSession>>,
}

impl AppState {
    /// Creates a new `AppState` without a tutor.
    #[must_use]
    pub const fn new(driver: Driver) -> Self {
        Self {
            driver,
            tutor: None,
        }
    }

    /// Attaches a tutor session.
    #[must_use]
    pub fn with_tutor(mut self, tutor: TutorSession) -> Self {
        self.tutor = Some(Arc::new(tutor));
        self
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// The request was malformed or out of range.
    BadRequest(String),
    /// The feature is not available.
    Unavailable(String),
    /// Anything else.
    Internal(String),
}

impl From<SortvizError> for ApiError {
    fn from(err: SortvizError) -> Self {
        if err.is_invalid_input() {
            Self::BadRequest(err.to_string())
        } else if matches!(err, SortvizError::TutorNotConfigured) {
            Self::Unavailable(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// The router has:
/// - All API routes under `/api`
/// - The WebSocket stream at `/ws`
/// - CORS middleware for development
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS for development (allow all origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let ws_routes = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(Arc::new(WsState::new(state.driver.clone())));

    let api_routes = Router::new()
        .route("/state", get(handle_state))
        .route("/algorithms", get(handle_algorithms))
        .route("/play", post(handle_play))
        .route("/pause", post(handle_pause))
        .route("/stop", post(handle_stop))
        .route("/reset", post(handle_reset))
        .route("/shuffle", post(handle_shuffle))
        .route("/speed", post(handle_speed))
        .route("/algorithm", post(handle_algorithm))
        .route("/override", post(handle_override))
        .route("/tutor/message", post(handle_tutor_message))
        .route("/tutor/hint", post(handle_tutor_hint));

    Router::new()
        .nest("/api", api_routes)
        .with_state(Arc::new(state))
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `GET /api/state`.
async fn handle_state(State(state): State<Arc<AppState>>) -> Json<PlaybackSnapshot> {
    Json(state.driver.snapshot().await)
}

/// Handler for `GET /api/algorithms`.
async fn handle_algorithms() -> Json<Vec<AlgorithmInfo>> {
    Json(Algorithm::ALL.iter().map(|a| a.info()).collect())
}

/// Handler for `POST /api/play`.
async fn handle_play(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let snapshot = state.driver.play().await?;
    info!(algorithm = %snapshot.algorithm, epoch = snapshot.epoch, "Play requested");
    Ok(Json(snapshot))
}

/// Handler for `POST /api/pause`.
async fn handle_pause(State(state): State<Arc<AppState>>) -> Json<PlaybackSnapshot> {
    Json(state.driver.pause().await)
}

/// Handler for `POST /api/stop`.
async fn handle_stop(State(state): State<Arc<AppState>>) -> Json<PlaybackSnapshot> {
    Json(state.driver.stop().await)
}

/// Handler for `POST /api/reset`.
async fn handle_reset(State(state): State<Arc<AppState>>) -> Json<PlaybackSnapshot> {
    if let Some(tutor) = &state.tutor {
        tutor.reset_hints().await;
    }
    Json(state.driver.reset().await)
}

/// Handler for `POST /api/shuffle`.
async fn handle_shuffle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ShuffleRequest>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let snapshot = state.driver.shuffle(request).await.map_err(|e| {
        warn!(size = request.size, error = %e, "Rejected shuffle");
        e
    })?;
    Ok(Json(snapshot))
}

/// Handler for `POST /api/speed`.
async fn handle_speed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SpeedRequest>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    Ok(Json(state.driver.set_speed(request.ms).await?))
}

/// Handler for `POST /api/algorithm`.
async fn handle_algorithm(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AlgorithmRequest>,
) -> Result<Json<PlaybackSnapshot>, ApiError> {
    let algorithm: Algorithm = request
        .algorithm
        .parse()
        .map_err(|e| ApiError::from(SortvizError::from(e)))?;
    Ok(Json(state.driver.select_algorithm(algorithm).await?))
}

/// Handler for `POST /api/override`.
async fn handle_override(
    State(state): State<Arc<AppState>>,
    Json(update): Json<VisualizerUpdate>,
) -> Json<OverrideResponse> {
    let outcome = state.driver.submit_external_step(update).await;
    Json(OverrideResponse {
        outcome,
        snapshot: state.driver.snapshot().await,
    })
}

/// Handler for `POST /api/tutor/message`.
async fn handle_tutor_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TutorMessageRequest>,
) -> Result<Json<TutorExchange>, ApiError> {
    let tutor = state
        .tutor
        .as_ref()
        .ok_or_else(|| ApiError::from(SortvizError::TutorNotConfigured))?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message must not be empty".to_string()));
    }

    let exchange = tutor.send_message(message).await;
    info!(
        fallback = exchange.fallback,
        outcome = %exchange.outcome,
        "Tutor message handled"
    );
    Ok(Json(exchange))
}

/// Handler for `POST /api/tutor/hint`.
async fn handle_tutor_hint(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TutorHint>, ApiError> {
    let tutor = state
        .tutor
        .as_ref()
        .ok_or_else(|| ApiError::from(SortvizError::TutorNotConfigured))?;
    Ok(Json(tutor.hint().await))
}

// ============================================================================
// Tests
// ============================================================================
