//! Route definitions for the OAuth login flow.

use axum::routing::get;
use axum::Router;

use crate::handlers::oauth;
use crate::state::AppState;

/// OAuth routes.
///
/// ```text
/// GET /api/login/{provider}       -> login
/// GET /api/callback/{provider}    -> callback (?code, ?state)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/login/{provider}", get(oauth::login))
        .route("/api/callback/{provider}", get(oauth::callback))
}
