#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The OAuth `state` parameter is unknown, expired, already consumed, or
    /// was issued for a different provider.
    #[error("Invalid state parameter")]
    InvalidState,

    /// The provider rejected the code exchange or the profile fetch.
    #[error("Upstream authorization failed: {0}")]
    UpstreamAuth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
