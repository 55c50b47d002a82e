//! Chat and session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/chats                     - Save a chat turn
//! - GET    /api/v1/users/{user_id}/sessions  - List a user's sessions
//! - GET    /api/v1/users/{user_id}/chats     - All turns for a user
//! - POST   /api/v1/sessions                  - Mint a new session id
//! - GET    /api/v1/sessions/{session_id}     - Session history, cache first
//! - DELETE /api/v1/sessions/{session_id}     - Delete a session

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use parlor_types::chat::{ChatTurn, SessionSummary};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Message returned in place of turns when a session has no history.
pub const NO_HISTORY_MESSAGE: &str = "No chat history available.";

/// Request body for saving a chat turn.
///
/// Fields are optional so a missing one is reported as a validation error
/// rather than a deserialization failure. camelCase names are accepted too.
/// `response` must be present but may be an empty string.
#[derive(Debug, Deserialize)]
pub struct SaveChatRequest {
    #[serde(alias = "userId")]
    pub user_id: Option<String>,
    #[serde(alias = "sessionId")]
    pub session_id: Option<String>,
    pub message: Option<String>,
    pub response: Option<String>,
}

/// Session history payload.
#[derive(Debug, Serialize)]
pub struct HistoryBody {
    pub session_id: String,
    pub turns: Vec<ChatTurn>,
    /// True when served from the session cache.
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Result of a session delete.
#[derive(Debug, Serialize)]
pub struct DeleteBody {
    pub session_id: String,
    pub deleted_turns: u64,
}

/// POST /api/v1/chats - Persist a turn and append it to the cached session.
pub async fn save_chat(
    State(state): State<AppState>,
    payload: Result<Json<SaveChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ChatTurn>>), AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let user_id = required(req.user_id, "user_id")?;
    let session_id = required(req.session_id, "session_id")?;
    let message = required(req.message, "message")?;
    let response = required(req.response, "response")?;

    let turn = state
        .session_service
        .save_turn(&user_id, &session_id, &message, &response)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(turn, request_id, elapsed)
        .with_link("session", &format!("/api/v1/sessions/{session_id}"));

    Ok((StatusCode::CREATED, Json(resp)))
}

/// GET /api/v1/sessions/{session_id} - Session history, cache first.
///
/// A session without history is not an error: the response carries an empty
/// turn list and an explanatory message.
pub async fn get_session_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<HistoryBody>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let history = state
        .session_service
        .get_session_history(&session_id)
        .await?;

    let body = match history {
        Some(history) => HistoryBody {
            session_id: session_id.clone(),
            cached: history.is_cached(),
            turns: history.turns,
            message: None,
        },
        None => HistoryBody {
            session_id: session_id.clone(),
            turns: Vec::new(),
            cached: false,
            message: Some(NO_HISTORY_MESSAGE),
        },
    };

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(body, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{session_id}"));

    Ok(Json(resp))
}

/// GET /api/v1/users/{user_id}/sessions - A user's sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<SessionSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let sessions = state.session_service.list_sessions(&user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(sessions, request_id, elapsed)
        .with_link("self", &format!("/api/v1/users/{user_id}/sessions"))
        .with_link("chats", &format!("/api/v1/users/{user_id}/chats"));

    Ok(Json(resp))
}

/// GET /api/v1/users/{user_id}/chats - Every turn a user has written.
pub async fn list_user_chats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ChatTurn>>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let turns = state.session_service.get_user_history(&user_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(turns, request_id, elapsed)
        .with_link("self", &format!("/api/v1/users/{user_id}/chats"));

    Ok(Json(resp))
}

/// POST /api/v1/sessions - Mint a fresh session id.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<SessionSummary>>) {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let session = state.session_service.create_session();
    let href = format!("/api/v1/sessions/{}", session.session_id);

    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(session, request_id, elapsed).with_link("self", &href);

    (StatusCode::CREATED, Json(resp))
}

/// DELETE /api/v1/sessions/{session_id} - Delete a session. Idempotent.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<DeleteBody>>, AppError> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let deleted_turns = state.session_service.delete_session(&session_id).await?;

    let elapsed = start.elapsed().as_millis() as u64;

    let body = DeleteBody {
        session_id,
        deleted_turns,
    };

    Ok(Json(ApiResponse::success(body, request_id, elapsed)))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}
