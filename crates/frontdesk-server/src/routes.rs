//! Router wiring for the HTTP API.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the router over the shared state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session/new", post(handlers::new_session))
        .route("/api/chat", post(handlers::chat))
        .route(
            "/api/session/{session_id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/api/session/{session_id}/escalate",
            post(handlers::escalate_session),
        )
        .route("/api/faqs", get(handlers::list_faqs))
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/health", get(handlers::health))
        .with_state(state)
}
