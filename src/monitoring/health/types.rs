//! Health checking types and data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Overall status derived from the share of failed checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// `unhealthy` above 50% failed checks, `degraded` above 20%
    pub fn from_error_rate(error_rate: f64) -> Self {
        if error_rate > 0.5 {
            HealthStatus::Unhealthy
        } else if error_rate > 0.2 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
            HealthStatus::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub healthy: bool,
    pub message: String,
    pub last_check: DateTime<Utc>,
    pub response_time_ms: u64,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ComponentHealth {
    pub fn healthy<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::new(name, true, message)
    }

    pub fn unhealthy<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::new(name, false, message)
    }

    fn new<N: Into<String>, M: Into<String>>(name: N, healthy: bool, message: M) -> Self {
        Self {
            name: name.into(),
            healthy,
            message: message.into(),
            last_check: Utc::now(),
            response_time_ms: 0,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub(super) fn timed(mut self, response_time_ms: u64) -> Self {
        self.response_time_ms = response_time_ms;
        self
    }
}

/// Outcome of one composite health check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    /// `failed_checks / total_checks`
    pub error_rate: f64,
    pub total_checks: usize,
    pub failed_checks: usize,
    /// Wall time of the whole run
    pub response_time_ms: u64,
    /// Process memory use, when it could be sampled
    pub memory_usage_percent: Option<f64>,
    pub components: BTreeMap<String, ComponentHealth>,
}

impl HealthCheckResult {
    pub(super) fn from_components(
        components: Vec<ComponentHealth>,
        response_time_ms: u64,
        memory_usage_percent: Option<f64>,
    ) -> Self {
        let total_checks = components.len();
        let failed_checks = components.iter().filter(|c| !c.healthy).count();
        let error_rate = if total_checks == 0 {
            0.0
        } else {
            failed_checks as f64 / total_checks as f64
        };

        Self {
            status: HealthStatus::from_error_rate(error_rate),
            timestamp: Utc::now(),
            error_rate,
            total_checks,
            failed_checks,
            response_time_ms,
            memory_usage_percent,
            components: components.into_iter().map(|c| (c.name.clone(), c)).collect(),
        }
    }
}

/// Payload served by the health endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub version: String,
    pub checks: BTreeMap<String, ComponentHealth>,
}

impl HealthReport {
    /// 200 while healthy or degraded, 503 once unhealthy
    pub fn http_status(&self) -> u16 {
        match self.status {
            HealthStatus::Healthy | HealthStatus::Degraded => 200,
            HealthStatus::Unhealthy => 503,
        }
    }
}
