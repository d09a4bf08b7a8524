//! Configuration file parsing for the server.
//!
//! Loads settings from TOML: bind address, database path, the fan-out
//! timeout budget, and the cache sweep interval.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Path to the SQLite plant database. When omitted, an in-memory
    /// database with the demo seed is used.
    #[serde(default)]
    pub database_path: Option<String>,

    /// Fan-out timeout budget in seconds
    #[serde(default = "default_budget_secs")]
    pub budget_secs: u64,

    /// Cache sweep interval in seconds
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_budget_secs() -> u64 {
    20
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for local runs: loopback bind, seeded
    /// in-memory database
    pub fn default_local_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            database_path: None,
            budget_secs: default_budget_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
