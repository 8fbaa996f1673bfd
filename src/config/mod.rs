//! Configuration management for the core
//!
//! This module handles loading, validation, and management of all configuration.

pub mod loader;
pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Retry, circuit breaker and reconnect configuration
    #[serde(default)]
    pub resilience: ResilienceConfig,
    /// Metrics, health checks and alerting configuration
    #[serde(default)]
    pub monitoring: MonitoringConfig,
    /// Deployment environment reported in alerts and health reports
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            resilience: ResilienceConfig::default(),
            monitoring: MonitoringConfig::default(),
            environment: default_environment(),
            service_name: default_service_name(),
        }
    }
}

impl CoreConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::parse_file(path.as_ref()).await?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Load the file if given, otherwise the defaults, then overlay the environment
    ///
    /// Environment variables win over values from the file.
    pub async fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::parse_file(path.as_ref()).await?,
            None => Self::default(),
        };

        let config = base.apply_env()?;
        config.validate()?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    async fn parse_file(path: &Path) -> Result<Self> {
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CoreError::Config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| CoreError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Self::default().apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.database
            .validate()
            .map_err(|e| CoreError::Config(format!("Database config error: {}", e)))?;

        self.resilience
            .validate()
            .map_err(|e| CoreError::Config(format!("Resilience config error: {}", e)))?;

        self.monitoring
            .validate()
            .map_err(|e| CoreError::Config(format!("Monitoring config error: {}", e)))?;

        if self.service_name.trim().is_empty() {
            return Err(CoreError::Config("Service name cannot be empty".to_string()));
        }

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| CoreError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
