//! Generation session model and row mapping.

use djpersona_core::persona::Persona;
use djpersona_core::types::{DbId, SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// The raw listening data a persona was synthesized from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceText {
    pub artists_text: String,
    pub genres_text: String,
}

/// Everything produced by one generation request.
///
/// Only `prompts` (and `updated_at`) change after creation, when prompts
/// are regenerated for the stored persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    pub session_id: SessionId,
    pub persona: Persona,
    pub prompts: Vec<String>,
    pub image_filenames: Vec<String>,
    pub source_text: SourceText,
    pub photos_used: i32,
    pub failed_images: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `generation_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct GenerationSessionRow {
    pub id: DbId,
    pub session_id: String,
    pub persona: Json<Persona>,
    pub prompts: Json<Vec<String>>,
    pub image_filenames: Json<Vec<String>>,
    pub artists_text: String,
    pub genres_text: String,
    pub photos_used: i32,
    pub failed_images: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<GenerationSessionRow> for GenerationRecord {
    fn from(row: GenerationSessionRow) -> Self {
        Self {
            session_id: row.session_id,
            persona: row.persona.0,
            prompts: row.prompts.0,
            image_filenames: row.image_filenames.0,
            source_text: SourceText {
                artists_text: row.artists_text,
                genres_text: row.genres_text,
            },
            photos_used: row.photos_used,
            failed_images: row.failed_images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
