//! Resilience configuration validators

use super::trait_def::Validate;
use crate::config::models::*;
use crate::utils::error::recovery::{DEFAULT_POLICY, RetryConfig};
use tracing::debug;

impl Validate for ResilienceConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating resilience configuration");

        if self.max_consecutive_failures == 0 {
            return Err("max_consecutive_failures must be greater than 0".to_string());
        }

        if self.circuit_breaker_timeout_ms == 0 {
            return Err("Circuit breaker timeout must be greater than 0".to_string());
        }

        if self.health_check_interval_ms == 0 {
            return Err("Connection health check interval must be greater than 0".to_string());
        }

        if self.reconnect_base_delay_ms > self.reconnect_max_delay_ms {
            return Err(format!(
                "Reconnect base delay ({}ms) cannot exceed max delay ({}ms)",
                self.reconnect_base_delay_ms, self.reconnect_max_delay_ms
            ));
        }

        if self.query_history_size == 0 {
            return Err("Query history size must be greater than 0".to_string());
        }

        if !self.retry_policies.contains_key(DEFAULT_POLICY) {
            return Err(format!("Retry policy '{}' must be defined", DEFAULT_POLICY));
        }

        for (name, policy) in &self.retry_policies {
            policy
                .validate()
                .map_err(|e| format!("Retry policy '{}': {}", name, e))?;
        }

        Ok(())
    }
}

impl Validate for RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".to_string());
        }

        if self.base_delay_ms > self.max_delay_ms {
            return Err(format!(
                "base delay ({}ms) cannot exceed max delay ({}ms)",
                self.base_delay_ms, self.max_delay_ms
            ));
        }

        Ok(())
    }
}
