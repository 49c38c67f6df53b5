//! Route definitions for the `/session` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::session;
use crate::state::AppState;

/// Routes mounted at `/api/session`.
///
/// ```text
/// GET /{session_id}               -> get_session
/// GET /{session_id}/{provider}    -> get_provider_data
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{session_id}", get(session::get_session))
        .route("/{session_id}/{provider}", get(session::get_provider_data))
}
