use std::sync::Arc;

use djpersona_db::store::SessionStore;
use djpersona_imagegen::ImageGenerator;

use crate::config::ServerConfig;
use crate::oauth::{OAuthStateStore, ProviderRegistry};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Generation records, PostgreSQL or in-memory.
    pub sessions: Arc<dyn SessionStore>,
    /// Pending OAuth state tokens and connected provider data.
    pub oauth_states: Arc<OAuthStateStore>,
    /// OAuth providers by path name.
    pub providers: Arc<ProviderRegistry>,
    /// Image backend plus per-session output directory.
    pub image_generator: Arc<ImageGenerator>,
}
