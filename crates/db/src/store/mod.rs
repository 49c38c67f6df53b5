//! Session store abstraction injected into request handlers.
//!
//! Handlers only ever see `Arc<dyn SessionStore>`, so the same code runs
//! against PostgreSQL in production and against [`InMemorySessionStore`]
//! in tests or when no database is configured.

mod memory;
mod postgres;

pub use memory::InMemorySessionStore;
pub use postgres::PgSessionStore;

use async_trait::async_trait;

use crate::models::generation_session::GenerationRecord;

/// Keyed persistence of generation records.
///
/// Operations are atomic per session id. Concurrent writes to the same id
/// are not serialized: the last writer wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Short name for logs and health output.
    fn backend_name(&self) -> &'static str;

    /// Insert a record, overwriting any record with the same session id.
    async fn upsert(&self, record: &GenerationRecord) -> Result<(), sqlx::Error>;

    /// Fetch a record by session id.
    async fn find(&self, session_id: &str) -> Result<Option<GenerationRecord>, sqlx::Error>;

    /// Overwrite the prompt list only. Returns `false` if the session is absent.
    async fn update_prompts(&self, session_id: &str, prompts: &[String])
        -> Result<bool, sqlx::Error>;

    /// Verify the backing storage is reachable.
    async fn health_check(&self) -> Result<(), sqlx::Error>;
}
