// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_core::domains::identity::JwtService;
use trip_core::domains::membership::QrSigner;
use trip_core::domains::notifications::NotificationSweep;
use trip_core::kernel::{scheduled_tasks, ServerDeps, StreamHub};
use trip_core::server::{build_app, AppState};
use trip_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,trip_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting trip coordination API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Wire dependencies
    let stream_hub = StreamHub::new();
    let deps = Arc::new(ServerDeps::postgres(
        pool.clone(),
        stream_hub.clone(),
        QrSigner::new(config.qr_signing_secret.clone()),
    ));
    let jwt_service = Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone()));

    // Start the reminder sweep; keep the handle alive for the server's lifetime
    let _scheduler = scheduled_tasks::start_scheduler(
        NotificationSweep::from_deps(&deps),
        stream_hub,
        &config.notification_sweep_cron,
    )
    .await
    .context("Failed to start scheduled tasks")?;

    // Build application
    let app = build_app(
        AppState::new(deps, jwt_service, Some(pool)),
        &config.allowed_origins,
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
