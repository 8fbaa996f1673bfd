//! Resilience configuration: retry policies, circuit breaking and reconnects

use super::*;
use crate::utils::error::recovery::{CircuitBreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Connection resilience configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    /// Consecutive failures before the connection is considered unhealthy.
    /// Also used as the circuit breaker threshold.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// How long an open circuit rejects calls, in milliseconds
    #[serde(default = "default_circuit_breaker_timeout_ms")]
    pub circuit_breaker_timeout_ms: u64,
    /// Interval between background connection probes, in milliseconds
    #[serde(default = "default_connection_check_interval_ms")]
    pub health_check_interval_ms: u64,
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    #[serde(default = "default_reconnect_base_delay_ms")]
    pub reconnect_base_delay_ms: u64,
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    /// Number of recent operations kept in the query history
    #[serde(default = "default_query_history_size")]
    pub query_history_size: usize,
    /// Named retry policies
    #[serde(default = "default_retry_policies")]
    pub retry_policies: HashMap<String, RetryConfig>,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_timeout_ms: default_circuit_breaker_timeout_ms(),
            health_check_interval_ms: default_connection_check_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_base_delay_ms: default_reconnect_base_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            query_history_size: default_query_history_size(),
            retry_policies: default_retry_policies(),
        }
    }
}

impl ResilienceConfig {
    /// Circuit breaker settings derived from this configuration
    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.max_consecutive_failures,
            cooldown: Duration::from_millis(self.circuit_breaker_timeout_ms),
        }
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    /// Delay before reconnect attempt `attempt` (1-based), doubling up to the max
    pub fn reconnect_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let delay = self
            .reconnect_base_delay_ms
            .saturating_mul(1u64 << exponent)
            .min(self.reconnect_max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Built-in retry policies
pub fn default_retry_policies() -> HashMap<String, RetryConfig> {
    let mut policies = HashMap::new();
    policies.insert("database".to_string(), RetryConfig::new(3, 1_000, 10_000));
    policies.insert("ai_service".to_string(), RetryConfig::new(3, 2_000, 30_000));
    policies.insert("integration".to_string(), RetryConfig::new(3, 1_000, 15_000));
    policies
}
