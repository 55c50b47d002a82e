//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`, plus an unversioned `/health`.
//! Middleware: CORS, tracing.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Chat turns
        .route("/chats", post(handlers::session::save_chat))
        // Per-user views
        .route(
            "/users/{user_id}/sessions",
            get(handlers::session::list_sessions),
        )
        .route(
            "/users/{user_id}/chats",
            get(handlers::session::list_user_chats),
        )
        // Sessions
        .route("/sessions", post(handlers::session::create_session))
        .route(
            "/sessions/{session_id}",
            get(handlers::session::get_session_history).delete(handlers::session::delete_session),
        )
        // Cache introspection
        .route("/debug/cache", get(handlers::debug::dump_cache))
        .route("/debug/cache/clear", post(handlers::debug::clear_cache));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus a database round trip.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let database_ok = sqlx::query("SELECT 1")
        .execute(&state.db_pool.reader)
        .await
        .is_ok();

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if database_ok { "ok" } else { "degraded" },
            "database": database_ok,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
