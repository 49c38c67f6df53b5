//! Sequential batch generation into a per-session directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use djpersona_core::naming::generated_image_filename;
use serde::Serialize;

use crate::backend::{FailurePolicy, ImageBackend};
use crate::placeholder::render_placeholder;

/// Result of running a prompt list through a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Files written, in prompt order (`dj_image_{i+1}.png`).
    pub filenames: Vec<String>,
    /// Prompts whose backend call or file write failed.
    pub failed: usize,
    /// Failed prompts that were filled with a placeholder.
    pub placeholders: usize,
}

/// Drives an [`ImageBackend`] over a prompt list, one prompt at a time.
pub struct ImageGenerator {
    backend: Arc<dyn ImageBackend>,
    policy: FailurePolicy,
    output_root: PathBuf,
}

impl ImageGenerator {
    pub fn new(
        backend: Arc<dyn ImageBackend>,
        policy: FailurePolicy,
        output_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            policy,
            output_root: output_root.into(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Directory holding the generated images of one session.
    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.output_root.join(session_id)
    }

    /// Generate one image per prompt, sequentially.
    ///
    /// The session directory is cleared first, so it only ever holds the
    /// images of the latest batch. Never fails as a whole: a prompt whose generation fails is either
    /// skipped or replaced by a placeholder according to the policy, and
    /// counted in [`BatchOutcome::failed`].
    pub async fn generate_batch(
        &self,
        session_id: &str,
        prompts: &[String],
        palette: &[String],
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let dir = self.session_dir(session_id);

        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::debug!(session_id, "Cleared previous session images"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(error = %e, dir = %dir.display(), "Failed to clear session image directory");
            }
        }

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::error!(error = %e, dir = %dir.display(), "Failed to create session image directory");
            outcome.failed = prompts.len();
            return outcome;
        }

        for (i, prompt) in prompts.iter().enumerate() {
            let mut counted_failure = false;

            let bytes = match self.backend.generate(prompt).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        backend = self.backend.name(),
                        session_id,
                        index = i + 1,
                        "Image generation failed"
                    );
                    outcome.failed += 1;
                    counted_failure = true;

                    match self.policy {
                        FailurePolicy::Skip => continue,
                        FailurePolicy::Placeholder => match render_placeholder(palette) {
                            Ok(bytes) => {
                                outcome.placeholders += 1;
                                bytes
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Placeholder rendering failed");
                                continue;
                            }
                        },
                    }
                }
            };

            let filename = generated_image_filename(i);
            let path = dir.join(&filename);
            match tokio::fs::write(&path, &bytes).await {
                Ok(()) => {
                    tracing::debug!(session_id, file = %filename, bytes = bytes.len(), "Image written");
                    outcome.filenames.push(filename);
                }
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to write image");
                    if counted_failure {
                        outcome.placeholders -= 1;
                    } else {
                        outcome.failed += 1;
                    }
                }
            }
        }

        tracing::info!(
            session_id,
            backend = self.backend.name(),
            written = outcome.filenames.len(),
            failed = outcome.failed,
            placeholders = outcome.placeholders,
            "Image batch finished"
        );
        outcome
    }
}
