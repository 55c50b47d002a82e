//! Cache introspection endpoints.
//!
//! GET  /api/v1/debug/cache       - Dump cached sessions, most recent first
//! POST /api/v1/debug/cache/clear - Drop every cached session

use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use parlor_types::chat::CacheSnapshot;

use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Result of a cache clear.
#[derive(Debug, Serialize)]
pub struct ClearBody {
    pub cleared: usize,
}

/// GET /api/v1/debug/cache - Snapshot of the session cache.
pub async fn dump_cache(State(state): State<AppState>) -> Json<ApiResponse<CacheSnapshot>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let snapshot = state.session_service.cache_snapshot();

    let elapsed = start.elapsed().as_millis() as u64;

    Json(
        ApiResponse::success(snapshot, request_id, elapsed)
            .with_link("clear", "/api/v1/debug/cache/clear"),
    )
}

/// POST /api/v1/debug/cache/clear - Empty the session cache.
///
/// Stored history is untouched; the next read of each session reloads it.
pub async fn clear_cache(State(state): State<AppState>) -> Json<ApiResponse<ClearBody>> {
    let start = Instant::now();
    let request_id = Uuid::now_v7().to_string();

    let cleared = state.session_service.clear_cache();

    let elapsed = start.elapsed().as_millis() as u64;

    Json(ApiResponse::success(ClearBody { cleared }, request_id, elapsed))
}
