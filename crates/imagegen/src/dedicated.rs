//! Dedicated image-generation backend (OpenAI-compatible images API).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::{decode_image, ensure_success, ImageBackend};
use crate::error::ImageGenError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "dall-e-3";
pub const IMAGE_SIZE: &str = "1024x1024";

/// `POST /v1/images/generations` request.
#[derive(Debug, Serialize)]
pub struct ImagesRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub n: u32,
    pub size: &'a str,
    pub response_format: &'a str,
}

/// `POST /v1/images/generations` response.
#[derive(Debug, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
pub struct ImageDatum {
    pub b64_json: Option<String>,
}

impl ImagesResponse {
    /// The first base64 payload, if any.
    pub fn first_image(&self) -> Option<&str> {
        self.data.iter().find_map(|d| d.b64_json.as_deref())
    }
}

/// HTTP client for a dedicated image-generation API.
pub struct DedicatedImageBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl DedicatedImageBackend {
    /// Create a backend reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_key: String,
        base_url: Option<String>,
        model: Option<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }
}

#[async_trait]
impl ImageBackend for DedicatedImageBackend {
    fn name(&self) -> &'static str {
        "dedicated"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        let request = ImagesRequest {
            model: &self.model,
            prompt,
            n: 1,
            size: IMAGE_SIZE,
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let body: ImagesResponse = ensure_success(response).await?.json().await?;
        let b64 = body.first_image().ok_or(ImageGenError::EmptyResponse)?;
        decode_image(b64)
    }
}
