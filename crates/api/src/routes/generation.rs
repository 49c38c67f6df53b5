//! Route definitions for persona generation.

use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use tower_http::timeout::TimeoutLayer;

use crate::config::ServerConfig;
use crate::handlers::generation;
use crate::state::AppState;

/// Upper bound for a multipart generation request (form fields plus photos).
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Generation routes, each with its own timeout.
///
/// ```text
/// POST /api/generate                          -> generate (multipart, generation timeout)
/// POST /api/regenerate-prompts/{session_id}   -> regenerate_prompts (request timeout)
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/api/generate",
            post(generation::generate)
                .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    config.generation_timeout(),
                )),
        )
        .route(
            "/api/regenerate-prompts/{session_id}",
            post(generation::regenerate_prompts).layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.request_timeout_secs),
            )),
        )
}
