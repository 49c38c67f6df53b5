#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use djpersona_api::config::{GenerationConfig, ServerConfig};
use djpersona_api::oauth::spotify::SpotifyConfig;
use djpersona_api::oauth::{
    AccessToken, OAuthError, OAuthProvider, OAuthStateStore, ProviderData, ProviderRegistry,
};
use djpersona_api::router::build_app_router;
use djpersona_api::state::AppState;
use djpersona_db::store::InMemorySessionStore;
use djpersona_imagegen::{
    BackendKind, FailurePolicy, ImageBackend, ImageBackendConfig, ImageGenError, ImageGenerator,
};

pub const FRONTEND_URL: &str = "http://localhost:3000";

/// Bytes every successful fake image call returns.
pub const FAKE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\nfake";

/// Build a test `ServerConfig` with safe defaults rooted at `static_dir`.
pub fn test_config(static_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![FRONTEND_URL.to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
        frontend_url: FRONTEND_URL.to_string(),
        static_dir,
        spotify: SpotifyConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:8001/api/callback/spotify".to_string(),
            accounts_base_url: "http://127.0.0.1:9".to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
        },
        image: ImageBackendConfig {
            kind: BackendKind::Dedicated,
            api_key: "test-key".to_string(),
            base_url: None,
            model: None,
            timeout: Duration::from_secs(5),
        },
        generation: GenerationConfig::default(),
        oauth_state_ttl: Duration::from_secs(600),
        oauth_session_ttl: Duration::from_secs(3600),
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Image backend that always succeeds with [`FAKE_IMAGE`].
pub struct FakeImageBackend;

#[async_trait]
impl ImageBackend for FakeImageBackend {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        Ok(FAKE_IMAGE.to_vec())
    }
}

/// Image backend that always fails.
pub struct FailingImageBackend;

#[async_trait]
impl ImageBackend for FailingImageBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        Err(ImageGenError::Api {
            status: 500,
            body: "upstream exploded".to_string(),
        })
    }
}

/// Image backend that succeeds after a fixed delay per call.
pub struct SlowImageBackend {
    pub delay: Duration,
}

#[async_trait]
impl ImageBackend for SlowImageBackend {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        tokio::time::sleep(self.delay).await;
        Ok(FAKE_IMAGE.to_vec())
    }
}

/// Image backend whose calls fail once [`SwitchableImageBackend::fail`]
/// has been called.
#[derive(Default)]
pub struct SwitchableImageBackend {
    failing: AtomicBool,
}

impl SwitchableImageBackend {
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageBackend for SwitchableImageBackend {
    fn name(&self) -> &'static str {
        "switchable"
    }

    async fn generate(&self, _prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ImageGenError::Api {
                status: 503,
                body: "overloaded".to_string(),
            });
        }
        Ok(FAKE_IMAGE.to_vec())
    }
}

/// OAuth provider named `spotify` that answers without network access.
///
/// Codes equal to `"bad-code"` are rejected like a provider would reject an
/// expired or forged code.
pub struct FakeProvider;

pub fn fake_profile() -> ProviderData {
    ProviderData::new(
        vec!["Black Coffee".to_string(), "Keinemusik".to_string()],
        vec!["afro house".to_string(), "deep house".to_string()],
    )
}

#[async_trait]
impl OAuthProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "spotify"
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://auth.test/authorize?client_id=test-client&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> Result<AccessToken, OAuthError> {
        if code == "bad-code" {
            return Err(OAuthError::Upstream {
                status: 400,
                body: r#"{"error":"invalid_grant"}"#.to_string(),
            });
        }
        Ok(AccessToken {
            access_token: format!("token-for-{code}"),
            token_type: Some("Bearer".to_string()),
            expires_in: Some(3600),
        })
    }

    async fn fetch_profile(&self, _token: &AccessToken) -> Result<ProviderData, OAuthError> {
        Ok(fake_profile())
    }
}

// ---------------------------------------------------------------------------
// Test application
// ---------------------------------------------------------------------------

/// Router plus the state behind it, so tests can inspect the stores.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub static_dir: TempDir,
}

impl TestApp {
    /// A fresh handle on the router; `oneshot` consumes it.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    pub fn generated_file(&self, session_id: &str, filename: &str) -> PathBuf {
        self.state.image_generator.session_dir(session_id).join(filename)
    }
}

/// Build the full application router with the in-memory session store, a
/// fake OAuth provider and an always-succeeding image backend.
pub fn build_test_app() -> TestApp {
    build_test_app_with(Arc::new(FakeImageBackend), FailurePolicy::Placeholder)
}

/// Like [`build_test_app`] with a custom image backend and failure policy.
pub fn build_test_app_with(backend: Arc<dyn ImageBackend>, policy: FailurePolicy) -> TestApp {
    build_test_app_configured(backend, policy, |_| {})
}

/// Like [`build_test_app_with`], with a hook to adjust the config first.
///
/// Goes through the same [`build_app_router`] as `main.rs`, so tests exercise
/// the production middleware stack.
pub fn build_test_app_configured(
    backend: Arc<dyn ImageBackend>,
    policy: FailurePolicy,
    configure: impl FnOnce(&mut ServerConfig),
) -> TestApp {
    let static_dir = tempfile::tempdir().unwrap();
    let mut config = test_config(static_dir.path().to_path_buf());
    configure(&mut config);

    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::new(InMemorySessionStore::new()),
        oauth_states: Arc::new(OAuthStateStore::new(
            config.oauth_state_ttl,
            config.oauth_session_ttl,
        )),
        providers: Arc::new(ProviderRegistry::new().with(Arc::new(FakeProvider))),
        image_generator: Arc::new(ImageGenerator::new(
            backend,
            policy,
            config.generated_dir(),
        )),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        static_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_multipart(app: Router, uri: &str, form: MultipartForm) -> Response<Body> {
    let (content_type, body) = form.finish();
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Minimal `multipart/form-data` encoder for request bodies.
pub struct MultipartForm {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "djpersona-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n",
                self.boundary
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", self.boundary),
            self.body,
        )
    }
}
