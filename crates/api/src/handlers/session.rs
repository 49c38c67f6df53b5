//! Handlers for the `/session` resource.

use axum::extract::{Path, State};
use axum::Json;
use djpersona_core::error::CoreError;
use djpersona_core::naming::validate_session_id;
use djpersona_db::models::generation_session::GenerationRecord;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::handlers::oauth::find_provider;
use crate::oauth::ProviderData;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDataResponse {
    /// `null` when the session never connected or has expired.
    pub provider_data: Option<ProviderData>,
}

/// GET /api/session/{session_id}
///
/// Returns the stored generation record, or 404.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<GenerationRecord>> {
    validate_session_id(&session_id)?;

    let record = state.sessions.find(&session_id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id.clone(),
        })
    })?;
    Ok(Json(record))
}

/// GET /api/session/{session_id}/{provider}
///
/// Provider data attached by a successful OAuth callback.
pub async fn get_provider_data(
    State(state): State<AppState>,
    Path((session_id, provider_name)): Path<(String, String)>,
) -> AppResult<Json<ProviderDataResponse>> {
    let provider = find_provider(&state, &provider_name)?;
    let provider_data = state
        .oauth_states
        .profile(&session_id, provider.name())
        .await;
    Ok(Json(ProviderDataResponse { provider_data }))
}
