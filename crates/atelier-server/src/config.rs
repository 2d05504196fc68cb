//! Server configuration management

use crate::error::{ApiError, Result};
use atelier_registry::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// SQLite connection string
    pub database_url: String,

    /// Upper bound for one registry transaction, in seconds
    pub transaction_timeout_seconds: u64,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,

    /// Whether to enable debug logging
    pub debug: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ApiError::Config("Invalid PORT value".to_string()))?,
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./data/atelier.db".to_string()),
            transaction_timeout_seconds: std::env::var("TRANSACTION_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| {
                    ApiError::Config("Invalid TRANSACTION_TIMEOUT_SECONDS value".to_string())
                })?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            debug: std::env::var("DEBUG")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        })
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig::with_timeout(Duration::from_secs(self.transaction_timeout_seconds))
    }

    /// Default log filter when RUST_LOG is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug {
            "atelier_server=debug,atelier_registry=debug,tower_http=debug"
        } else {
            "atelier_server=info,atelier_registry=info,tower_http=info"
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "sqlite:./data/atelier.db".to_string(),
            transaction_timeout_seconds: 30,
            cors_origins: vec!["*".to_string()],
            debug: false,
        }
    }
}
