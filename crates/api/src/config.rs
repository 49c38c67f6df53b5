use std::fmt::Debug;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use djpersona_core::prompts::VariantTable;
use djpersona_imagegen::{BackendKind, ImageBackendConfig};

use crate::oauth::spotify::SpotifyConfig;

/// Server configuration loaded from environment variables.
///
/// All non-secret fields have defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`). `POST /api/generate`
    /// uses [`ServerConfig::generation_timeout`] instead.
    pub request_timeout_secs: u64,
    /// Grace period for background tasks after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// PostgreSQL URL. When unset, sessions are kept in memory.
    pub database_url: Option<String>,
    /// Frontend base URL the OAuth callback redirects to.
    pub frontend_url: String,
    /// Root of the static file tree; generated images live in `generated/`.
    pub static_dir: PathBuf,
    /// Spotify OAuth client settings.
    pub spotify: SpotifyConfig,
    /// Image backend selection and credentials.
    pub image: ImageBackendConfig,
    /// Prompt rendering settings.
    pub generation: GenerationConfig,
    /// Lifetime of an issued, not yet consumed OAuth state token.
    pub oauth_state_ttl: Duration,
    /// Lifetime of provider data attached to a consumed state token.
    pub oauth_session_ttl: Duration,
}

/// How many prompts a generation renders, and from which variant table.
#[derive(Debug, Clone, Copy)]
pub struct GenerationConfig {
    /// Prompts per generation and per regeneration (default: `4`).
    pub prompt_count: usize,
    /// Variant table (default: `studio`).
    pub variant_table: VariantTable,
}

impl GenerationConfig {
    /// Prompts actually rendered per request; the count is clamped to the
    /// variant table length.
    pub fn rendered_prompt_count(&self) -> usize {
        self.prompt_count.min(self.variant_table.variants().len())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            prompt_count: 4,
            variant_table: VariantTable::Studio,
        }
    }
}

impl ServerConfig {
    /// Directory holding generated images, one subdirectory per session.
    pub fn generated_dir(&self) -> PathBuf {
        self.static_dir.join("generated")
    }

    /// Timeout for a generation request: one full image timeout per rendered
    /// prompt, plus the regular request timeout as headroom for form parsing,
    /// placeholders and the store write.
    pub fn generation_timeout(&self) -> Duration {
        let prompts = u32::try_from(self.generation.rendered_prompt_count()).unwrap_or(u32::MAX);
        self.image
            .timeout
            .saturating_mul(prompts)
            .saturating_add(Duration::from_secs(self.request_timeout_secs))
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                  |
    /// |--------------------------|--------------------------|
    /// | `HOST`                   | `0.0.0.0`                |
    /// | `PORT`                   | `8001`                   |
    /// | `CORS_ORIGINS`           | `http://localhost:3000`  |
    /// | `REQUEST_TIMEOUT_SECS`   | `300`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`  | `30`                     |
    /// | `DATABASE_URL`           | unset (in-memory store)  |
    /// | `FRONTEND_URL`           | `http://localhost:3000`  |
    /// | `STATIC_DIR`             | `static`                 |
    /// | `IMAGE_BACKEND`          | `dedicated`              |
    /// | `IMAGE_API_KEY`          | **required**             |
    /// | `IMAGE_API_BASE_URL`     | backend default          |
    /// | `IMAGE_MODEL`            | backend default          |
    /// | `IMAGE_TIMEOUT_SECS`     | `120`                    |
    /// | `PROMPT_COUNT`           | `4`                      |
    /// | `PROMPT_VARIANTS`        | `studio`                 |
    /// | `OAUTH_STATE_TTL_SECS`   | `600`                    |
    /// | `OAUTH_SESSION_TTL_SECS` | `3600`                   |
    ///
    /// Spotify settings are documented on [`SpotifyConfig::from_env`].
    ///
    /// # Panics
    ///
    /// Panics on missing secrets or unparsable values, so misconfiguration
    /// fails at startup.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = parse_env("PORT", "8001");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_env("REQUEST_TIMEOUT_SECS", "300");
        let shutdown_timeout_secs: u64 = parse_env("SHUTDOWN_TIMEOUT_SECS", "30");

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .trim_end_matches('/')
            .to_string();

        let static_dir = PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()));

        let image_api_key =
            std::env::var("IMAGE_API_KEY").expect("IMAGE_API_KEY must be set in the environment");
        assert!(!image_api_key.is_empty(), "IMAGE_API_KEY must not be empty");

        let image = ImageBackendConfig {
            kind: parse_env::<BackendKind>("IMAGE_BACKEND", "dedicated"),
            api_key: image_api_key,
            base_url: optional_env("IMAGE_API_BASE_URL"),
            model: optional_env("IMAGE_MODEL"),
            timeout: Duration::from_secs(parse_env("IMAGE_TIMEOUT_SECS", "120")),
        };

        let generation = GenerationConfig {
            prompt_count: parse_env("PROMPT_COUNT", "4"),
            variant_table: parse_env("PROMPT_VARIANTS", "studio"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            database_url,
            frontend_url,
            static_dir,
            spotify: SpotifyConfig::from_env(),
            image,
            generation,
            oauth_state_ttl: Duration::from_secs(parse_env("OAUTH_STATE_TTL_SECS", "600")),
            oauth_session_ttl: Duration::from_secs(parse_env("OAUTH_SESSION_TTL_SECS", "3600")),
        }
    }
}

/// Read and parse an env var, falling back to `default`.
///
/// # Panics
///
/// Panics if the value (or the default) does not parse.
fn parse_env<T>(name: &str, default: &str) -> T
where
    T: FromStr,
    T::Err: Debug,
{
    let raw = std::env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .unwrap_or_else(|e| panic!("{name} has an invalid value '{raw}': {e:?}"))
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}
