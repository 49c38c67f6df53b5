pub mod generation;
pub mod health;
pub mod oauth;
pub mod session;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree. Paths below are relative to `/api`.
///
/// Route hierarchy:
///
/// ```text
/// /                                      service banner
///
/// /login/{provider}                      start OAuth (returns authUrl)
/// /callback/{provider}                   OAuth redirect target
///
/// /generate                              persona + prompts + images (POST, multipart)
/// /regenerate-prompts/{session_id}       fresh prompts for a stored persona (POST)
///
/// /session/{session_id}                  stored generation record
/// /session/{session_id}/{provider}       connected provider data
/// ```
///
/// Generation routes carry their own timeouts and are mounted separately
/// by the app router via [`generation::router`], as is the static image
/// tree under `/api/static/generated`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api", get(handlers::root::index))
        .route("/api/", get(handlers::root::index))
        .merge(oauth::router())
        .nest("/api/session", session::router())
}
