//! Linkshelf API server

use linkshelf::{api, core, db};

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (handles CLI args, env vars, and config file)
    let config = match core::config::Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Logging isn't initialized yet
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let _logger = match core::Logger::init(&config.logging) {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return Err(e);
        }
    };

    info!("Starting Linkshelf API v{}", linkshelf::VERSION);
    info!(
        host = %config.server.host,
        port = config.server.port,
        "Server configuration"
    );
    info!(
        access_expiration_minutes = config.jwt.access_expiration_minutes,
        refresh_expiration_minutes = config.jwt.refresh_expiration_minutes,
        rotate_refresh_tokens = config.jwt.rotate_refresh_tokens,
        "Token configuration"
    );

    info!(path = ?config.database.path, "Initializing database...");
    let db = Arc::new(db::DatabaseManager::from_config(&config.database)?);
    info!("Database initialized successfully");

    let server = api::ApiServer::new(&config, db);

    info!(
        url = %format!("http://{}:{}", config.server.host, config.server.port),
        "Server ready - starting to serve requests"
    );

    server.serve().await?;

    Ok(())
}
