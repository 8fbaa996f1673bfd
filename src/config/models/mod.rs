//! Configuration data models
//!
//! This module defines all configuration structures used by the core.

#![allow(missing_docs)]

pub mod monitoring;
pub mod resilience;
pub mod storage;

// Re-export all configuration types
pub use monitoring::*;
pub use resilience::*;
pub use storage::*;

/// Default database URL
pub fn default_database_url() -> String {
    "postgresql://localhost/contentplan".to_string()
}

/// Default connection pool size
pub fn default_pool_size() -> u32 {
    10
}

pub fn default_min_connections() -> u32 {
    1
}

/// Default connect timeout in milliseconds
pub fn default_connect_timeout_ms() -> u64 {
    10_000
}

pub fn default_idle_timeout_ms() -> u64 {
    30_000
}

pub fn default_acquire_timeout_ms() -> u64 {
    30_000
}

pub fn default_max_lifetime_ms() -> u64 {
    30 * 60 * 1000
}

pub fn default_max_consecutive_failures() -> u32 {
    5
}

pub fn default_circuit_breaker_timeout_ms() -> u64 {
    60_000
}

/// Interval between connection probes in milliseconds
pub fn default_connection_check_interval_ms() -> u64 {
    30_000
}

pub fn default_max_reconnect_attempts() -> u32 {
    5
}

pub fn default_reconnect_base_delay_ms() -> u64 {
    1_000
}

pub fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

pub fn default_query_history_size() -> usize {
    1_000
}

/// Interval between composite health checks in milliseconds
pub fn default_health_check_interval_ms() -> u64 {
    60_000
}

pub fn default_cleanup_interval_ms() -> u64 {
    60 * 60 * 1000
}

pub fn default_retention_days() -> u32 {
    7
}

/// Metrics store retention window in milliseconds
pub fn default_metrics_retention_ms() -> u64 {
    60 * 60 * 1000
}

pub fn default_max_points_per_series() -> usize {
    10_000
}

pub fn default_max_records() -> usize {
    10_000
}

pub fn default_environment() -> String {
    "development".to_string()
}

pub fn default_service_name() -> String {
    "contentplan".to_string()
}
