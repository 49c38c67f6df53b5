/// Errors from the image generation layer.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The image API returned a non-2xx status code.
    #[error("Image API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response was successful but carried no image.
    #[error("Image API returned no image data")]
    EmptyResponse,

    #[error("Invalid base64 image payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Unknown image backend '{0}' (expected 'chat' or 'dedicated')")]
    UnknownBackend(String),
}
