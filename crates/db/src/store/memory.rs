use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::generation_session::GenerationRecord;
use crate::store::SessionStore;

/// [`SessionStore`] kept in process memory. Contents are lost on restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    records: RwLock<HashMap<String, GenerationRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert(&self, record: &GenerationRecord) -> Result<(), sqlx::Error> {
        self.records
            .write()
            .await
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn find(&self, session_id: &str) -> Result<Option<GenerationRecord>, sqlx::Error> {
        Ok(self.records.read().await.get(session_id).cloned())
    }

    async fn update_prompts(
        &self,
        session_id: &str,
        prompts: &[String],
    ) -> Result<bool, sqlx::Error> {
        let mut records = self.records.write().await;
        match records.get_mut(session_id) {
            Some(record) => {
                record.prompts = prompts.to_vec();
                record.updated_at = chrono::Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), sqlx::Error> {
        Ok(())
    }
}
