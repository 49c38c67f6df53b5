/// Surrogate key of a `generation_sessions` row (BIGSERIAL).
pub type DbId = i64;

/// UTC timestamp used for record creation and update times.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Opaque session identifier. Either supplied by the client or a fresh UUID.
pub type SessionId = String;
