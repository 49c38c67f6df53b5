//! Spotify authorization-code flow and top-artists lookup.

use async_trait::async_trait;
use indexmap::IndexSet;
use serde_json::Value;

use super::{ensure_success, AccessToken, OAuthError, OAuthProvider, ProviderData};

pub const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";
pub const API_BASE_URL: &str = "https://api.spotify.com";
pub const SCOPE: &str = "user-top-read";
pub const TOP_ARTISTS_LIMIT: u32 = 20;

/// Spotify client credentials.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub accounts_base_url: String,
    pub api_base_url: String,
}

impl SpotifyConfig {
    /// Load Spotify settings from environment variables.
    ///
    /// | Env Var                 | Required | Default                        |
    /// |-------------------------|----------|--------------------------------|
    /// | `SPOTIFY_CLIENT_ID`     | yes      | --                             |
    /// | `SPOTIFY_CLIENT_SECRET` | yes      | --                             |
    /// | `SPOTIFY_REDIRECT_URI`  | yes      | --                             |
    /// | `SPOTIFY_ACCOUNTS_URL`  | no       | `https://accounts.spotify.com` |
    /// | `SPOTIFY_API_URL`       | no       | `https://api.spotify.com`      |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing or empty.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            let value = std::env::var(name)
                .unwrap_or_else(|_| panic!("{name} must be set in the environment"));
            assert!(!value.is_empty(), "{name} must not be empty");
            value
        };

        Self {
            client_id: required("SPOTIFY_CLIENT_ID"),
            client_secret: required("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: required("SPOTIFY_REDIRECT_URI"),
            accounts_base_url: std::env::var("SPOTIFY_ACCOUNTS_URL")
                .unwrap_or_else(|_| ACCOUNTS_BASE_URL.into()),
            api_base_url: std::env::var("SPOTIFY_API_URL").unwrap_or_else(|_| API_BASE_URL.into()),
        }
    }
}

pub struct SpotifyProvider {
    client: reqwest::Client,
    config: SpotifyConfig,
}

impl SpotifyProvider {
    pub fn new(client: reqwest::Client, config: SpotifyConfig) -> Self {
        Self { client, config }
    }

    fn accounts_url(&self, path: &str) -> String {
        format!("{}{path}", self.config.accounts_base_url.trim_end_matches('/'))
    }
}

/// Collect artist names and the de-duplicated union of their genres from a
/// `/v1/me/top/artists` response. Genres keep first-seen order.
pub fn parse_top_artists(body: &Value) -> ProviderData {
    let items = body
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut artists = Vec::with_capacity(items.len());
    let mut genres = IndexSet::new();

    for item in items {
        if let Some(name) = item.get("name").and_then(Value::as_str) {
            artists.push(name.to_string());
        }
        if let Some(list) = item.get("genres").and_then(Value::as_array) {
            genres.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }

    ProviderData::new(artists, genres.into_iter().collect())
}

#[async_trait]
impl OAuthProvider for SpotifyProvider {
    fn name(&self) -> &'static str {
        "spotify"
    }

    fn authorize_url(&self, state: &str) -> String {
        let base = self.accounts_url("/authorize");
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", SCOPE),
            ("state", state),
        ];
        match reqwest::Url::parse_with_params(&base, &params) {
            Ok(url) => url.into(),
            Err(e) => {
                tracing::error!(error = %e, base = %base, "Invalid Spotify accounts URL");
                base
            }
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuthError> {
        let response = self
            .client
            .post(self.accounts_url("/api/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        let token: AccessToken = ensure_success(response).await?.json().await?;
        if token.access_token.is_empty() {
            return Err(OAuthError::Malformed("empty access_token".into()));
        }
        Ok(token)
    }

    async fn fetch_profile(&self, token: &AccessToken) -> Result<ProviderData, OAuthError> {
        let url = format!(
            "{}/v1/me/top/artists",
            self.config.api_base_url.trim_end_matches('/')
        );
        let limit = TOP_ARTISTS_LIMIT.to_string();
        let response = self
            .client
            .get(url)
            .bearer_auth(&token.access_token)
            .query(&[("time_range", "short_term"), ("limit", limit.as_str())])
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        Ok(parse_top_artists(&body))
    }
}
