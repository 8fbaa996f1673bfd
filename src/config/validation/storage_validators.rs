//! Storage configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

const SUPPORTED_SCHEMES: &[&str] = &["postgres", "postgresql", "sqlite"];

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating database configuration");

        if self.url.trim().is_empty() {
            return Err("Database URL cannot be empty".to_string());
        }

        let scheme = self.url.split(':').next().unwrap_or_default();
        if !SUPPORTED_SCHEMES.contains(&scheme) {
            return Err(format!(
                "Unsupported database scheme '{}', expected one of: {}",
                scheme,
                SUPPORTED_SCHEMES.join(", ")
            ));
        }

        if self.pool_size == 0 {
            return Err("Database pool size must be greater than 0".to_string());
        }

        if self.min_connections > self.pool_size {
            return Err(format!(
                "Minimum connections ({}) cannot exceed pool size ({})",
                self.min_connections, self.pool_size
            ));
        }

        if self.connect_timeout_ms == 0 {
            return Err("Database connect timeout must be greater than 0".to_string());
        }

        if self.acquire_timeout_ms == 0 {
            return Err("Database acquire timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
