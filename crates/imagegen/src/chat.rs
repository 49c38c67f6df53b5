//! Multimodal chat backend.
//!
//! Sends the prompt as a user turn to a Gemini-style `generateContent`
//! endpoint with image output enabled, and takes the first inline image
//! part of the reply.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backend::{decode_image, ensure_success, ImageBackend};
use crate::error::ImageGenError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

const SYSTEM_INSTRUCTION: &str =
    "You are an expert AI image generator creating professional DJ persona photos.";

/// HTTP client for a multimodal chat model that can answer with images.
pub struct ChatImageBackend {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ChatImageBackend {
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

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

/// Request body for a single-turn image request.
pub fn request_body(prompt: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
    })
}

/// Find the first inline image payload (base64) in a `generateContent` reply.
///
/// Accepts both the camelCase and snake_case spellings of `inlineData`.
pub fn extract_inline_image(body: &Value) -> Option<&str> {
    body.get("candidates")?
        .as_array()?
        .iter()
        .filter_map(|candidate| candidate.pointer("/content/parts")?.as_array())
        .flatten()
        .find_map(|part| {
            let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
            inline.get("data")?.as_str()
        })
}

#[async_trait]
impl ImageBackend for ChatImageBackend {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageGenError> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await?;

        let body: Value = ensure_success(response).await?.json().await?;
        let b64 = extract_inline_image(&body).ok_or(ImageGenError::EmptyResponse)?;
        decode_image(b64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_inline_image_after_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "Here is your image." },
                        { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } },
                        { "inlineData": { "mimeType": "image/png", "data": "c2Vjb25k" } }
                    ]
                }
            }]
        });
        assert_eq!(extract_inline_image(&body), Some("aGVsbG8="));
    }

    #[test]
    fn accepts_snake_case_inline_data() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "inline_data": { "data": "eA==" } }] } }]
        });
        assert_eq!(extract_inline_image(&body), Some("eA=="));
    }

    #[test]
    fn text_only_reply_has_no_image() {
        let body = json!({
            "candidates": [{ "content": { "parts": [{ "text": "I cannot do that." }] } }]
        });
        assert_eq!(extract_inline_image(&body), None);
        assert_eq!(extract_inline_image(&json!({})), None);
    }

    #[test]
    fn request_enables_image_output() {
        let body = request_body("a DJ");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "a DJ");
        assert_eq!(body["generationConfig"]["responseModalities"][1], "IMAGE");
    }

    #[test]
    fn endpoint_uses_model_and_trims_base_url() {
        let backend = ChatImageBackend::with_client(
            reqwest::Client::new(),
            "k".into(),
            Some("http://proxy.local/".into()),
            None,
        );
        assert_eq!(
            backend.endpoint(),
            "http://proxy.local/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );
    }
}
