use async_trait::async_trait;

use crate::models::generation_session::GenerationRecord;
use crate::repositories::GenerationSessionRepo;
use crate::store::SessionStore;
use crate::DbPool;

/// [`SessionStore`] backed by the `generation_sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn upsert(&self, record: &GenerationRecord) -> Result<(), sqlx::Error> {
        let row = GenerationSessionRepo::upsert(&self.pool, record).await?;
        tracing::debug!(id = row.id, session_id = %row.session_id, "Generation session stored");
        Ok(())
    }

    async fn find(&self, session_id: &str) -> Result<Option<GenerationRecord>, sqlx::Error> {
        let row = GenerationSessionRepo::find_by_session_id(&self.pool, session_id).await?;
        Ok(row.map(GenerationRecord::from))
    }

    async fn update_prompts(
        &self,
        session_id: &str,
        prompts: &[String],
    ) -> Result<bool, sqlx::Error> {
        GenerationSessionRepo::update_prompts(&self.pool, session_id, prompts).await
    }

    async fn health_check(&self) -> Result<(), sqlx::Error> {
        crate::health_check(&self.pool).await
    }
}
