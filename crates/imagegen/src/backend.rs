//! The image backend trait and deployment-time backend selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::chat::ChatImageBackend;
use crate::dedicated::DedicatedImageBackend;
use crate::error::ImageGenError;

/// Turns one prompt into encoded image bytes.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Generate a single image for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageGenError>;
}

/// What the batch does with a prompt whose generation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Produce no file for the prompt.
    Skip,
    /// Write a generated placeholder marked "FALLBACK".
    Placeholder,
}

/// Which backend a deployment talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    Chat,
    #[default]
    Dedicated,
}

impl BackendKind {
    /// The chat backend drops failed prompts; the dedicated backend keeps the
    /// batch length stable with placeholders.
    pub fn failure_policy(self) -> FailurePolicy {
        match self {
            BackendKind::Chat => FailurePolicy::Skip,
            BackendKind::Dedicated => FailurePolicy::Placeholder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BackendKind::Chat => "chat",
            BackendKind::Dedicated => "dedicated",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = ImageGenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chat" => Ok(BackendKind::Chat),
            "dedicated" => Ok(BackendKind::Dedicated),
            other => Err(ImageGenError::UnknownBackend(other.to_string())),
        }
    }
}

/// Settings for constructing a backend.
#[derive(Debug, Clone)]
pub struct ImageBackendConfig {
    pub kind: BackendKind,
    pub api_key: String,
    /// Override of the provider base URL, e.g. for a proxy.
    pub base_url: Option<String>,
    /// Override of the provider's default model.
    pub model: Option<String>,
    /// Per-request timeout for image calls.
    pub timeout: Duration,
}

/// Build the configured backend behind a shared trait object.
pub fn build_backend(config: &ImageBackendConfig) -> Result<Arc<dyn ImageBackend>, ImageGenError> {
    let client = reqwest::Client::builder().timeout(config.timeout).build()?;

    let backend: Arc<dyn ImageBackend> = match config.kind {
        BackendKind::Chat => Arc::new(ChatImageBackend::with_client(
            client,
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )),
        BackendKind::Dedicated => Arc::new(DedicatedImageBackend::with_client(
            client,
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
        )),
    };
    Ok(backend)
}

// ---- shared HTTP helpers ----

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or an [`ImageGenError::Api`] containing the status
/// and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ImageGenError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ImageGenError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Decode a standard base64 image payload.
pub(crate) fn decode_image(b64: &str) -> Result<Vec<u8>, ImageGenError> {
    let bytes = STANDARD.decode(b64.trim())?;
    if bytes.is_empty() {
        return Err(ImageGenError::EmptyResponse);
    }
    Ok(bytes)
}
