//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket editor preview at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Editor
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/editor/parse", post(http::http_post_parse))
        .route("/api/v1/editor/render", post(http::http_post_render))
        .route("/api/v1/editor/validate", post(http::http_post_validate))
        // Lessons
        .route("/api/v1/lessons", get(http::http_list_lessons).post(http::http_create_lesson))
        .route(
            "/api/v1/lessons/:id",
            get(http::http_get_lesson)
                .put(http::http_put_lesson)
                .delete(http::http_delete_lesson),
        )
        .route("/api/v1/lessons/:id/text", get(http::http_get_lesson_text))
        .route("/api/v1/lessons/:id/play", get(http::http_get_play))
        .route("/api/v1/lessons/:id/attempts", post(http::http_post_attempt))
        .route("/api/v1/lessons/:id/stats", get(http::http_get_stats))
        .route("/api/v1/lessons/:id/explain", post(http::http_post_explain))
        // Quiz game
        .route("/api/v1/game", get(http::http_get_game))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
