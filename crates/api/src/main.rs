use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use djpersona_db::store::{InMemorySessionStore, PgSessionStore, SessionStore};
use djpersona_imagegen::ImageGenerator;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use djpersona_api::background::{self, oauth_state_eviction};
use djpersona_api::config::ServerConfig;
use djpersona_api::oauth::spotify::SpotifyProvider;
use djpersona_api::oauth::{OAuthStateStore, ProviderRegistry};
use djpersona_api::router::build_app_router;
use djpersona_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "djpersona_api=debug,djpersona_imagegen=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        image_backend = %config.image.kind,
        prompt_count = config.generation.prompt_count,
        variants = %config.generation.variant_table,
        "Loaded server configuration"
    );

    // --- Session store ---
    let sessions: Arc<dyn SessionStore> = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = djpersona_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            djpersona_db::health_check(&pool)
                .await
                .expect("Database health check failed");
            tracing::info!("Database health check passed");

            djpersona_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgSessionStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, sessions are kept in memory only");
            Arc::new(InMemorySessionStore::new())
        }
    };

    // --- Image generation ---
    let backend =
        djpersona_imagegen::build_backend(&config.image).expect("Failed to build image backend");
    let generated_dir = config.generated_dir();
    tokio::fs::create_dir_all(&generated_dir)
        .await
        .expect("Failed to create generated image directory");
    let image_generator = Arc::new(ImageGenerator::new(
        backend,
        config.image.kind.failure_policy(),
        generated_dir,
    ));
    tracing::info!(
        backend = image_generator.backend_name(),
        output = %image_generator.output_root().display(),
        "Image generator ready"
    );

    // --- OAuth ---
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to build HTTP client");
    let providers = Arc::new(
        ProviderRegistry::new().with(Arc::new(SpotifyProvider::new(
            http_client,
            config.spotify.clone(),
        ))),
    );
    let oauth_states = Arc::new(OAuthStateStore::new(
        config.oauth_state_ttl,
        config.oauth_session_ttl,
    ));

    // Spawn OAuth state eviction.
    let eviction_cancel = tokio_util::sync::CancellationToken::new();
    let eviction_handle = tokio::spawn(oauth_state_eviction::run(
        Arc::clone(&oauth_states),
        oauth_state_eviction::EVICTION_INTERVAL,
        eviction_cancel.clone(),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        sessions,
        oauth_states,
        providers,
        image_generator,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    eviction_cancel.cancel();
    background::join_with_timeout(
        "oauth_state_eviction",
        eviction_handle,
        Duration::from_secs(config.shutdown_timeout_secs),
    )
    .await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
