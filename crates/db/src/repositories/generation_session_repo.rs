//! Repository for the `generation_sessions` table.

use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::generation_session::{GenerationRecord, GenerationSessionRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, persona, prompts, image_filenames, artists_text, \
                       genres_text, photos_used, failed_images, created_at, updated_at";

/// Provides persistence operations for generation sessions.
pub struct GenerationSessionRepo;

impl GenerationSessionRepo {
    /// Insert a record, overwriting any existing row with the same session id.
    pub async fn upsert(
        pool: &PgPool,
        record: &GenerationRecord,
    ) -> Result<GenerationSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO generation_sessions
                (session_id, persona, prompts, image_filenames, artists_text, genres_text,
                 photos_used, failed_images, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (session_id) DO UPDATE SET
                persona = EXCLUDED.persona,
                prompts = EXCLUDED.prompts,
                image_filenames = EXCLUDED.image_filenames,
                artists_text = EXCLUDED.artists_text,
                genres_text = EXCLUDED.genres_text,
                photos_used = EXCLUDED.photos_used,
                failed_images = EXCLUDED.failed_images,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, GenerationSessionRow>(&query)
            .bind(&record.session_id)
            .bind(Json(&record.persona))
            .bind(Json(&record.prompts))
            .bind(Json(&record.image_filenames))
            .bind(&record.source_text.artists_text)
            .bind(&record.source_text.genres_text)
            .bind(record.photos_used)
            .bind(record.failed_images)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by its opaque session id.
    pub async fn find_by_session_id(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<GenerationSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM generation_sessions WHERE session_id = $1");
        sqlx::query_as::<_, GenerationSessionRow>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the prompt list of a session. Returns `true` if a row was updated.
    ///
    /// Persona and image filenames are left untouched.
    pub async fn update_prompts(
        pool: &PgPool,
        session_id: &str,
        prompts: &[String],
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE generation_sessions SET prompts = $2, updated_at = NOW()
             WHERE session_id = $1",
        )
        .bind(session_id)
        .bind(Json(prompts))
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
