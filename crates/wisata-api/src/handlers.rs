//! Route handler functions for all API endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wisata_chat::{ChatEntry, ChatReply, CityProfile, ClearFlow, SessionSummary};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request / response types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct CityRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub active_sessions: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub history: Vec<ChatEntry>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub session_id: Uuid,
    pub clear_flow: ClearFlow,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        active_sessions: state.orchestrator.list_sessions().await.len(),
    })
}

/// POST /chat - one turn; starts a session when none (or an unknown one)
/// is given.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let reply = state
        .orchestrator
        .handle_message(&req.message, req.session_id)
        .await?;
    tracing::debug!(session_id = %reply.session_id, intent = %reply.intent, "chat turn");
    Ok(Json(reply))
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<SessionSummary>> {
    Json(state.orchestrator.list_sessions().await)
}

/// GET /sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, ApiError> {
    state
        .orchestrator
        .list_sessions()
        .await
        .into_iter()
        .find(|s| s.id == id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("session not found: {id}")))
}

/// DELETE /sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.orchestrator.delete_session(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /sessions/{id}/history
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.orchestrator.history(id).await?;
    Ok(Json(HistoryResponse {
        session_id: id,
        history,
    }))
}

/// POST /sessions/{id}/clear
pub async fn request_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClearResponse>, ApiError> {
    let clear_flow = state.orchestrator.request_clear(id).await?;
    Ok(Json(ClearResponse {
        session_id: id,
        clear_flow,
    }))
}

/// POST /sessions/{id}/clear/confirm
pub async fn confirm_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let history = state.orchestrator.confirm_clear(id).await?;
    Ok(Json(HistoryResponse {
        session_id: id,
        history,
    }))
}

/// POST /sessions/{id}/clear/cancel
pub async fn cancel_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClearResponse>, ApiError> {
    let clear_flow = state.orchestrator.cancel_clear(id).await?;
    Ok(Json(ClearResponse {
        session_id: id,
        clear_flow,
    }))
}

/// POST /sessions/{id}/city - city lookup box.
pub async fn explore_city(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CityRequest>,
) -> Result<Json<CityProfile>, ApiError> {
    let profile = state.orchestrator.explore_city(id, &req.name).await?;
    Ok(Json(profile))
}
