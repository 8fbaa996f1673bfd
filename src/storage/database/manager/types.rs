//! Connection manager types

use crate::utils::error::recovery::{CircuitBreakerSnapshot, DEFAULT_POLICY};
use crate::utils::error::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Health of the managed connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionHealth {
    pub is_healthy: bool,
    pub last_check: DateTime<Utc>,
    /// Latency of the most recent probe or operation
    pub response_time_ms: f64,
    /// Failures seen since the manager started or was last refreshed
    pub error_count: u64,
    /// Failures since the last success
    pub consecutive_failures: u32,
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self {
            is_healthy: false,
            last_check: Utc::now(),
            response_time_ms: 0.0,
            error_count: 0,
            consecutive_failures: 0,
        }
    }
}

impl ConnectionHealth {
    pub(super) fn record_success(&mut self, response_time_ms: f64) {
        self.is_healthy = true;
        self.last_check = Utc::now();
        self.response_time_ms = response_time_ms;
        self.consecutive_failures = 0;
    }

    pub(super) fn record_failure(&mut self, response_time_ms: f64, max_consecutive_failures: u32) {
        self.last_check = Utc::now();
        self.response_time_ms = response_time_ms;
        self.error_count += 1;
        self.consecutive_failures += 1;
        if self.consecutive_failures >= max_consecutive_failures {
            self.is_healthy = false;
        }
    }
}

/// Lifecycle state of the managed pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting,
    /// Reconnect budget exhausted; manual refresh required
    Unavailable,
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Unavailable => "unavailable",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Describes a managed operation for logging, metrics and retry policy selection
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Operation label, e.g. `load_posts`
    pub operation: String,
    /// Table or resource touched
    pub resource: Option<String>,
    /// Retry policy name
    pub policy: String,
}

impl QueryContext {
    pub fn new<S: Into<String>>(operation: S) -> Self {
        Self {
            operation: operation.into(),
            resource: None,
            policy: DEFAULT_POLICY.to_string(),
        }
    }

    pub fn with_resource<S: Into<String>>(mut self, resource: S) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_policy<S: Into<String>>(mut self, policy: S) -> Self {
        self.policy = policy.into();
        self
    }
}

/// One entry of the recent query history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub operation: String,
    pub resource: Option<String>,
    pub duration_ms: f64,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub timestamp: DateTime<Utc>,
}

/// An in-flight transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInfo {
    pub id: String,
    pub started_at: DateTime<Utc>,
    /// Labels of operations applied so far
    pub operations: Vec<String>,
}

/// Lifetime query counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryStats {
    pub total_queries: u64,
    pub failed_queries: u64,
    /// Average over every query since start; windowed figures live in the metrics store
    pub lifetime_avg_response_time_ms: f64,
}

impl QueryStats {
    pub(super) fn record(&mut self, duration_ms: f64, success: bool) {
        self.total_queries += 1;
        if !success {
            self.failed_queries += 1;
        }
        let n = self.total_queries as f64;
        self.lifetime_avg_response_time_ms += (duration_ms - self.lifetime_avg_response_time_ms) / n;
    }
}

/// Pool settings reported in status output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolInfo {
    pub driver: String,
    pub size: u32,
    pub min_connections: u32,
    pub connect_timeout_ms: u64,
    pub idle_timeout_ms: u64,
}

/// Full status of the connection manager
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub health: ConnectionHealth,
    pub circuit_breaker: CircuitBreakerSnapshot,
    pub reconnect_attempts: u32,
    pub active_transactions: usize,
    pub query_stats: QueryStats,
    pub pool: PoolInfo,
}
