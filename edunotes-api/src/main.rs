//! # EduNotes API Server
//!
//! Serves organizations, memberships, invitations, note feedback, rankings
//! and notifications over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/edunotes JWT_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p edunotes-api
//! ```

use anyhow::Context;
use edunotes_api::{
    app::{build_router, AppState},
    config::Config,
};
use edunotes_shared::db::{migrations::run_migrations, pool};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edunotes_api=debug,edunotes_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("EduNotes API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    let db = pool::create_pool(config.pool_config())
        .await
        .context("Failed to connect to database")?;

    run_migrations(&db).await.context("Failed to run migrations")?;

    if config.operator.key_digest.is_none() {
        tracing::warn!("OPERATOR_KEY not set; score adjustment endpoints are disabled");
    }
    if config.policy.protect_last_owner {
        tracing::info!("Last-owner protection enabled");
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        // Keep serving; the process can still be killed
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
