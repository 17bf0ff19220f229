use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classifieds_board::{
    api::{create_router, AppState},
    config::Config,
    db,
    error::AppError,
    keepalive,
    realtime::Broadcaster,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,classifieds_board=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("🚀 Starting classifieds board v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!(
        "✅ Configuration loaded ({})",
        if config.production { "production" } else { "development" }
    );

    // Single-writer SQLite store
    let pool = db::connect(&config).await?;
    tracing::info!("✅ Database connected: {}", config.database_url);

    db::migrate(&pool).await?;
    tracing::info!("✅ Database migrations completed");

    // Shared application state
    let broadcaster = Arc::new(Broadcaster::new());
    let state = AppState::new(pool, config.clone(), broadcaster.clone());

    state.images.ensure_root().await?;
    tracing::info!("✅ Upload directory ready: {}", config.upload_dir.display());

    // Viewer count heartbeat
    broadcaster.spawn_heartbeat(Duration::from_secs(1));
    tracing::info!("✅ Viewer heartbeat started (every 1s)");

    if let Some(url) = config.keepalive_url.clone() {
        keepalive::spawn(url, Duration::from_secs(config.keepalive_interval_secs));
        tracing::info!("✅ Keepalive ping enabled (every {}s)", config.keepalive_interval_secs);
    }

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("🌐 Server listening on http://{}", addr);
    tracing::info!("");
    tracing::info!("📚 API Endpoints:");
    tracing::info!("  GET    /ping           - Liveness check");
    tracing::info!("  POST   /api/register   - Register with a password");
    tracing::info!("  POST   /api/login      - Login with a password");
    tracing::info!("  GET    /api/posts      - List posts, newest first");
    tracing::info!("  POST   /api/posts      - Create post (requires auth, multipart)");
    tracing::info!("  DELETE /api/posts/:id  - Delete own post (requires auth)");
    tracing::info!("  GET    /ws             - Realtime feed (WebSocket)");
    tracing::info!("  GET    /uploads/*      - Uploaded images");
    tracing::info!("");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("🛑 Shutdown signal received");
}
