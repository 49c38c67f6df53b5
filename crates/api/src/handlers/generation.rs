//! Handlers for persona generation and prompt regeneration.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use djpersona_core::error::CoreError;
use djpersona_core::naming::{is_image_content_type, validate_session_id};
use djpersona_core::persona::{synthesize, Persona};
use djpersona_core::prompts::{build_prompts, photo_context_prefix};
use djpersona_db::models::generation_session::{GenerationRecord, SourceText};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Multipart part names accepted for reference photos.
const PHOTO_FIELDS: [&str; 2] = ["photos", "photos[]"];

/// Parsed `POST /api/generate` form.
#[derive(Debug, Default)]
pub struct GenerateForm {
    pub session_id: Option<String>,
    pub artists_text: String,
    pub genres_text: String,
    /// Photo parts with an `image/*` content type.
    pub photos_used: usize,
    /// Photo parts with any other content type.
    pub photos_skipped: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub session_id: String,
    pub persona: Persona,
    pub prompts: Vec<String>,
    pub image_filenames: Vec<String>,
    pub total_images: usize,
    pub photos_used: usize,
    pub photos_skipped: usize,
    pub failed_images: usize,
}

#[derive(Debug, Serialize)]
pub struct RegeneratePromptsResponse {
    pub prompts: Vec<String>,
}

async fn read_generate_form(mut multipart: Multipart) -> AppResult<GenerateForm> {
    let mut form = GenerateForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "sessionId" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                form.session_id = Some(text.trim().to_string()).filter(|s| !s.is_empty());
            }
            "artistsText" => {
                form.artists_text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            "genresText" => {
                form.genres_text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
            }
            n if PHOTO_FIELDS.contains(&n) => {
                let is_image = field.content_type().is_some_and(is_image_content_type);
                // Photos only inform the prompt text; the bytes are drained and dropped.
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if is_image {
                    form.photos_used += 1;
                } else {
                    form.photos_skipped += 1;
                }
            }
            _ => {} // ignore unknown fields
        }
    }

    Ok(form)
}

/// POST /api/generate
///
/// Synthesizes a persona from the form, renders prompts, generates one
/// image per prompt and stores the result under the session id (a fresh
/// UUID when none is given). Image failures never fail the request; they
/// are reported in `failedImages`.
///
/// The batch runs on its own task, so a request that hits the generation
/// timeout still leaves a complete record behind.
pub async fn generate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Json<GenerateResponse>> {
    let form = read_generate_form(multipart).await?;

    let session_id = form
        .session_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    validate_session_id(&session_id)?;

    if form.photos_skipped > 0 {
        tracing::warn!(
            session_id = %session_id,
            skipped = form.photos_skipped,
            "Skipped non-image uploads"
        );
    }

    let response = tokio::spawn(run_generation(state, session_id, form))
        .await
        .map_err(|e| AppError::InternalError(format!("generation task failed: {e}")))??;

    Ok(Json(response))
}

async fn run_generation(
    state: AppState,
    session_id: String,
    form: GenerateForm,
) -> AppResult<GenerateResponse> {
    let persona = synthesize(&form.artists_text, &form.genres_text);
    let generation = state.config.generation;
    let prompts = build_prompts(
        &persona,
        generation.prompt_count,
        &photo_context_prefix(form.photos_used),
        generation.variant_table.variants(),
    );

    tracing::info!(
        session_id = %session_id,
        dj_name = %persona.dj_name,
        prompts = prompts.len(),
        photos = form.photos_used,
        backend = state.image_generator.backend_name(),
        "Generating persona images"
    );

    let outcome = state
        .image_generator
        .generate_batch(&session_id, &prompts, &persona.palette)
        .await;

    let now = chrono::Utc::now();
    let record = GenerationRecord {
        session_id: session_id.clone(),
        persona: persona.clone(),
        prompts: prompts.clone(),
        image_filenames: outcome.filenames.clone(),
        source_text: SourceText {
            artists_text: form.artists_text,
            genres_text: form.genres_text,
        },
        photos_used: to_i32(form.photos_used),
        failed_images: to_i32(outcome.failed),
        created_at: now,
        updated_at: now,
    };
    state.sessions.upsert(&record).await?;

    Ok(GenerateResponse {
        session_id,
        persona,
        prompts,
        total_images: outcome.filenames.len(),
        image_filenames: outcome.filenames,
        photos_used: form.photos_used,
        photos_skipped: form.photos_skipped,
        failed_images: outcome.failed,
    })
}

/// POST /api/regenerate-prompts/{session_id}
///
/// Re-renders the prompt list from the stored persona. The persona and
/// image filenames are left untouched.
pub async fn regenerate_prompts(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> AppResult<Json<RegeneratePromptsResponse>> {
    validate_session_id(&session_id)?;

    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Session",
            id: session_id.clone(),
        })
    };

    let record = state
        .sessions
        .find(&session_id)
        .await?
        .ok_or_else(not_found)?;

    let generation = state.config.generation;
    let photos_used = usize::try_from(record.photos_used).unwrap_or(0);
    let prompts = build_prompts(
        &record.persona,
        generation.prompt_count,
        &photo_context_prefix(photos_used),
        generation.variant_table.variants(),
    );

    if !state.sessions.update_prompts(&session_id, &prompts).await? {
        return Err(not_found());
    }

    tracing::info!(session_id = %session_id, prompts = prompts.len(), "Prompts regenerated");

    Ok(Json(RegeneratePromptsResponse { prompts }))
}

fn to_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}
