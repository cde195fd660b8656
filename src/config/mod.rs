//! # Configuration Management
//!
//! Environment-driven configuration for the listener service. Values are read
//! once at startup (after `.env` has been loaded) and validated before any
//! component is created.

pub mod settings;

pub use settings::{ApiServerConfig, DatabaseConfig, ObservabilityConfig};

use validator::Validate;

use crate::errors::{ListenerError, Result};

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub api: ApiServerConfig,
    pub database: DatabaseConfig,
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Self {
            api: ApiServerConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            observability: ObservabilityConfig::from_env()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        self.api.validate().map_err(ListenerError::from)?;
        self.database.validate().map_err(ListenerError::from)?;
        self.observability.validate().map_err(ListenerError::from)?;

        if !self.database.is_postgresql() && !self.database.is_memory() {
            return Err(ListenerError::config(
                "Database URL must start with 'postgresql://' or 'memory://'",
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ListenerError::config(
                "min_connections cannot be greater than max_connections",
            ));
        }

        if self.observability.enable_metrics && self.observability.metrics_port == self.api.port {
            return Err(ListenerError::config("API and metrics ports cannot be the same"));
        }

        Ok(())
    }
}
