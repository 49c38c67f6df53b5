//! Naming rules for generated assets and session identifiers.

use crate::error::CoreError;

/// Maximum accepted length of a client-supplied session id.
pub const MAX_SESSION_ID_LENGTH: usize = 128;

/// Filename of the `index`-th (zero-based) generated image of a session.
///
/// ```
/// use djpersona_core::naming::generated_image_filename;
///
/// assert_eq!(generated_image_filename(0), "dj_image_1.png");
/// ```
pub fn generated_image_filename(index: usize) -> String {
    format!("dj_image_{}.png", index + 1)
}

/// Whether an upload's declared content type is an image.
pub fn is_image_content_type(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

/// Validate a session id before it is used as a key and a directory name.
///
/// Only ASCII letters, digits, `-` and `_` are accepted, which rules out
/// path separators and `..`.
pub fn validate_session_id(session_id: &str) -> Result<(), CoreError> {
    if session_id.is_empty() {
        return Err(CoreError::Validation(
            "Session id must not be empty".to_string(),
        ));
    }
    if session_id.len() > MAX_SESSION_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Session id exceeds maximum length of {MAX_SESSION_ID_LENGTH} characters (got {})",
            session_id.len()
        )));
    }
    if !session_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "Session id '{session_id}' contains invalid characters"
        )));
    }
    Ok(())
}
