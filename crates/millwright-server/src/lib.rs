//! Millwright HTTP surface
//!
//! Wires the data layer, tool registry, response cache, and orchestrator
//! together and serves them over axum: `POST /query` for questions,
//! `GET /health` for liveness. Authentication and session management are
//! deliberately absent; `conversation_id` is pass-through correlation
//! only.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::ServerConfig;
use handlers::{create_router, AppState};
use millwright_agent::{Agent, AgentConfig};
use millwright_cache::{CacheSweeper, ResponseCache};
use millwright_data::SqliteDataStore;
use millwright_tools::ToolRegistry;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Data layer failed to open
    #[error("Data layer error: {0}")]
    Data(#[from] millwright_data::DataError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP server.
///
/// Opens the plant database (seeded in-memory when no path is
/// configured), builds the registry and orchestrator, spawns the cache
/// sweeper, and serves until the process is stopped.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = match &config.database_path {
        Some(path) => SqliteDataStore::open(path)?,
        None => SqliteDataStore::open_seeded()?,
    };
    let data = Arc::new(Mutex::new(store));

    let registry = Arc::new(ToolRegistry::builtin(Arc::clone(&data)));
    let capability_count = registry.len();

    let cache = Arc::new(ResponseCache::new());
    let sweeper = CacheSweeper::new(
        Arc::clone(&cache),
        Duration::from_secs(config.sweep_interval_secs),
    );
    tokio::spawn(async move { sweeper.run().await });

    let agent = Agent::new(registry)
        .with_cache(Arc::clone(&cache))
        .with_config(AgentConfig::default().with_budget(Duration::from_secs(config.budget_secs)));

    info!("Starting Millwright server");
    info!("Bind address: {}", config.bind_addr());
    info!("Capabilities: {}", capability_count);
    info!("Fan-out budget: {}s", config.budget_secs);
    match &config.database_path {
        Some(path) => info!("Database: {}", path),
        None => info!("Database: in-memory demo seed"),
    }

    let state = AppState {
        agent: Arc::new(agent),
        data,
        capability_count,
    };
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
