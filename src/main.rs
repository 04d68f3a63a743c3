//! giveaway-admin server entry point.
//!
//! Starts the Axum HTTP server with REST, WebSocket and media endpoints and
//! the background task that bridges database notifications to the change
//! bus.

use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use giveaway_admin::api;
use giveaway_admin::app_state::AppState;
use giveaway_admin::auth::{
    EXPIRED_SESSION_SWEEP, session_layer, session_store, spawn_session_sweeper,
};
use giveaway_admin::config::{AdminConfig, LogFormat};
use giveaway_admin::domain::ChangeBus;
use giveaway_admin::realtime::listener::spawn_listener;
use giveaway_admin::storage::LocalBlobStore;
use giveaway_admin::storage::local::MEDIA_ROUTE;
use giveaway_admin::store::PgStore;
use giveaway_admin::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AdminConfig::from_env()
        .map_err(|e| anyhow::anyhow!("invalid configuration: {e}"))?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting giveaway-admin");

    // Data store
    let store = PgStore::connect(&config)
        .await
        .context("connecting to the database")?;
    if config.run_migrations {
        store.migrate().await.context("running migrations")?;
    }

    // Change feed
    let change_bus = ChangeBus::new(config.change_bus_capacity);
    let _listener = spawn_listener(store.pool().clone(), change_bus.clone());

    // Sessions
    let sessions = session_store(store.pool().clone());
    let _sweeper = spawn_session_sweeper(sessions.clone(), EXPIRED_SESSION_SWEEP);

    // Media storage
    tokio::fs::create_dir_all(&config.media_root)
        .await
        .with_context(|| format!("creating {}", config.media_root.display()))?;
    let blobs = LocalBlobStore::new(&config.media_root, &config.public_base_url);
    let media = ServeDir::new(&config.media_root);

    let listen_addr = config.listen_addr;
    let secure_cookies = config.public_base_url.starts_with("https://");
    let session_ttl = config.session_ttl_secs;
    let request_timeout = Duration::from_secs(config.request_timeout_secs);
    let body_limit = config.max_image_bytes.saturating_mul(2);

    // Build application state
    let app_state = AppState::new(store, blobs, change_bus, config);

    // Build router
    let app = Router::new()
        .merge(api::build_router::<PgStore, LocalBlobStore>())
        .route("/ws", get(ws_handler::<PgStore, LocalBlobStore>))
        .nest_service(MEDIA_ROUTE, media)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(session_layer(sessions, session_ttl, secure_cookies))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
