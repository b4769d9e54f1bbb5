use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use filmoteka_api::{
    app,
    auth::JwtKeys,
    config,
    database::{schema, DatabaseManager},
    AppState,
};

#[derive(Debug, Parser)]
#[command(name = "filmoteka", version, about = "Actor and movie catalogue API")]
struct Args {
    /// Listen address; overrides FILMOTEKA_ADDR
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config::config();
    tracing::info!("Starting Filmoteka API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    schema::migrate(&pool, &config.database.schema)
        .await
        .context("failed to prepare the database schema")?;

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET_KEY is not set; logins will fail until it is configured");
    }
    let keys = JwtKeys::from_config(&config.security);

    let mut router = app(AppState::new(pool.clone(), keys))
        .layer(DefaultBodyLimit::max(config.server.max_request_size_bytes));
    if config.security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    let addr = args.addr.unwrap_or_else(|| config.server.addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(%addr, "Filmoteka API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
