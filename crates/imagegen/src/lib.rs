//! Image generation backends for persona prompts.
//!
//! One capability, [`backend::ImageBackend`], with two deployments:
//! a multimodal chat endpoint ([`chat::ChatImageBackend`]) and a dedicated
//! images endpoint ([`dedicated::DedicatedImageBackend`]). The
//! [`batch::ImageGenerator`] drives a backend over a prompt list and writes
//! the resulting PNGs into a per-session directory.

pub mod backend;
pub mod batch;
pub mod chat;
pub mod dedicated;
pub mod error;
pub mod placeholder;

pub use backend::{build_backend, BackendKind, FailurePolicy, ImageBackend, ImageBackendConfig};
pub use batch::{BatchOutcome, ImageGenerator};
pub use error::ImageGenError;
