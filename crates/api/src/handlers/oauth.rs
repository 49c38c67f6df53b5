//! Handlers for the OAuth login flow.
//!
//! `login` issues a single-use state token and returns the provider's
//! authorization URL. The provider redirects the browser back to
//! `callback`, which consumes the token, exchanges the code, fetches the
//! listener's top artists and stores them under the token for the frontend
//! to pick up via `GET /api/session/{state}/{provider}`.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::Json;
use djpersona_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::oauth::OAuthProvider;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_url: String,
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set instead of `code` when the user denied access.
    pub error: Option<String>,
}

pub(crate) fn find_provider(state: &AppState, name: &str) -> AppResult<Arc<dyn OAuthProvider>> {
    state.providers.get(name).ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Provider",
            id: name.to_string(),
        })
    })
}

/// GET /api/login/{provider}
pub async fn login(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
) -> AppResult<Json<LoginResponse>> {
    let provider = find_provider(&state, &provider_name)?;
    let token = state.oauth_states.issue(provider.name()).await;

    tracing::info!(provider = provider.name(), "Issued OAuth state");

    Ok(Json(LoginResponse {
        auth_url: provider.authorize_url(&token),
    }))
}

/// GET /api/callback/{provider}?code&state
///
/// Redirects (303) to `{FRONTEND_URL}/?connected=true&session={state}`.
/// Fails with `INVALID_STATE` for unknown, expired or reused tokens, and
/// with `UPSTREAM_AUTH_FAILURE` when the provider rejects the exchange.
pub async fn callback(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Redirect> {
    let provider = find_provider(&state, &provider_name)?;

    let token = query
        .state
        .filter(|s| !s.is_empty())
        .ok_or(CoreError::InvalidState)?;
    state.oauth_states.consume(&token, provider.name()).await?;

    let code = match (query.code.filter(|c| !c.is_empty()), query.error) {
        (Some(code), _) => code,
        (None, Some(reason)) => {
            return Err(CoreError::UpstreamAuth(format!("access denied: {reason}")).into())
        }
        (None, None) => {
            return Err(CoreError::UpstreamAuth("missing authorization code".into()).into())
        }
    };

    let access_token = provider.exchange_code(&code).await?;
    let data = provider.fetch_profile(&access_token).await?;

    tracing::info!(
        provider = provider.name(),
        artists = data.artists.len(),
        genres = data.genres.len(),
        "OAuth provider connected"
    );

    state
        .oauth_states
        .attach_profile(&token, provider.name(), data)
        .await;

    Ok(Redirect::to(&format!(
        "{}/?connected=true&session={token}",
        state.config.frontend_url
    )))
}
