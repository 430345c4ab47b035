//! HTTP route definitions

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::ArenaHandle;
use crate::util::time::uptime_secs;
use crate::ws::handler::ws_handler;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Support multiple origins (comma-separated in CLIENT_ORIGIN)
    let allowed_origins: Vec<header::HeaderValue> = state
        .config
        .client_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<header::HeaderValue>().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health_handler))
        .route("/arenas", get(arenas_handler))
        .route("/arenas/:id", get(arena_handler))
        .route("/ws", get(ws_handler))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    active_arenas: usize,
    active_players: usize,
}

async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: uptime_secs(),
        active_arenas: state.arenas.active_arenas(),
        active_players: state.arenas.total_players(),
    })
}

// ============================================================================
// Arena endpoints
// ============================================================================

#[derive(Serialize)]
struct ArenaSummary {
    arena_id: Uuid,
    player_count: usize,
    /// Connected sessions, joined or not
    reserved_slots: usize,
}

impl From<&ArenaHandle> for ArenaSummary {
    fn from(handle: &ArenaHandle) -> Self {
        Self {
            arena_id: handle.id,
            player_count: handle.player_count(),
            reserved_slots: handle.reserved_slots(),
        }
    }
}

async fn arenas_handler(State(state): State<AppState>) -> Json<Vec<ArenaSummary>> {
    Json(state.arenas.handles().iter().map(ArenaSummary::from).collect())
}

async fn arena_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArenaSummary>, AppError> {
    state
        .arenas
        .get(&id)
        .map(|handle| Json(ArenaSummary::from(&handle)))
        .ok_or_else(|| AppError::NotFound(format!("arena {}", id)))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
