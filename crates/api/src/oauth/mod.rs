//! Third-party OAuth: provider clients and the state-token store.
//!
//! A provider turns an authorization code into an access token and the
//! token into the listener's top artists and genres ([`ProviderData`]).
//! Providers are looked up by the `{provider}` path segment through a
//! [`ProviderRegistry`].

pub mod spotify;
pub mod state_store;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use state_store::OAuthStateStore;

/// Errors from talking to an OAuth provider.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Transport failure (connection refused, timeout, TLS).
    #[error("Provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("Provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The provider answered 2xx with an unexpected body.
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

/// Access token returned by a code exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Listening data fetched from a provider after a successful callback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderData {
    pub artists: Vec<String>,
    pub genres: Vec<String>,
    /// `artists` joined with `", "`, ready for the generation form.
    pub artists_text: String,
    /// `genres` joined with `", "`, ready for the generation form.
    pub genres_text: String,
}

impl ProviderData {
    pub fn new(artists: Vec<String>, genres: Vec<String>) -> Self {
        Self {
            artists_text: artists.join(", "),
            genres_text: genres.join(", "),
            artists,
            genres,
        }
    }
}

/// An OAuth2 authorization-code provider.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Path name of the provider, e.g. `"spotify"`.
    fn name(&self) -> &'static str;

    /// URL the user is sent to in order to grant access.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuthError>;

    /// Fetch the listener's top artists and their genres.
    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderData, OAuthError>;
}

/// Providers available to the login and callback routes, keyed by name.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Arc<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own [`OAuthProvider::name`].
    pub fn with(mut self, provider: Arc<dyn OAuthProvider>) -> Self {
        self.providers.insert(provider.name(), provider);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn OAuthProvider>> {
        self.providers.get(name).cloned()
    }
}

/// Map a non-2xx provider response into [`OAuthError::Upstream`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, OAuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(OAuthError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
