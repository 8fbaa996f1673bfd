//! Monitoring service types

use super::alerts::{Alert, AlertStats, AlertType};
use super::health::{HealthCheckResult, HealthStatus};
use super::metrics::{
    AiOverview, ApiOverview, DatabaseOverview, IntegrationOverview, MetricsSummary, Timestamped,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

/// Subsystem an application error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemErrorKind {
    Database,
    AiService,
    Authentication,
    Integration,
    Application,
}

impl SystemErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemErrorKind::Database => "database",
            SystemErrorKind::AiService => "ai_service",
            SystemErrorKind::Authentication => "authentication",
            SystemErrorKind::Integration => "integration",
            SystemErrorKind::Application => "application",
        }
    }

    /// Database and authentication failures page as critical
    pub fn alert_type(&self) -> AlertType {
        match self {
            SystemErrorKind::Database | SystemErrorKind::Authentication => AlertType::Critical,
            _ => AlertType::Error,
        }
    }
}

impl fmt::Display for SystemErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request details attached to a recorded error
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub user_id: Option<String>,
    pub request_id: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ErrorContext {
    pub fn with_user<S: Into<String>>(mut self, user_id: S) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_request<S: Into<String>>(mut self, request_id: S) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_metadata<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// One entry of the error log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemError {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SystemErrorKind,
    pub message: String,
    /// Rendered cause chain of the underlying error
    pub stack: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<String>,
    pub request_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Timestamped for SystemError {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Compact record of one health check run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthMetricsRecord {
    pub timestamp: DateTime<Utc>,
    pub status: HealthStatus,
    pub error_rate: f64,
    pub response_time_ms: u64,
    pub memory_usage_percent: Option<f64>,
}

impl Timestamped for HealthMetricsRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl From<&HealthCheckResult> for HealthMetricsRecord {
    fn from(result: &HealthCheckResult) -> Self {
        Self {
            timestamp: result.timestamp,
            status: result.status,
            error_rate: result.error_rate,
            response_time_ms: result.response_time_ms,
            memory_usage_percent: result.memory_usage_percent,
        }
    }
}

/// Counters describing the monitoring service itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringStats {
    pub uptime_seconds: u64,
    pub current_status: Option<HealthStatus>,
    pub last_health_check: Option<DateTime<Utc>>,
    pub total_health_checks: u64,
    pub health_records: usize,
    pub active_alerts: usize,
    pub total_errors: u64,
    /// Errors still held in the log, by type
    pub errors_by_type: BTreeMap<String, usize>,
    pub alerts: AlertStats,
    pub metric_series: usize,
}

/// Everything the monitoring dashboard shows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub generated_at: DateTime<Utc>,
    pub window_ms: u64,
    pub health: Option<HealthCheckResult>,
    pub stats: MonitoringStats,
    pub metrics: MetricsSummary,
    pub api_overview: ApiOverview,
    pub database_overview: DatabaseOverview,
    pub ai_overview: AiOverview,
    pub integration_overview: IntegrationOverview,
    pub recent_alerts: Vec<Alert>,
    pub recent_errors: Vec<SystemError>,
}

/// Consolidated monitoring state - single lock for history and counters
#[derive(Debug, Default)]
pub(super) struct MonitoringStorage {
    pub(super) health_history: VecDeque<HealthMetricsRecord>,
    pub(super) errors: VecDeque<SystemError>,
    pub(super) last_health: Option<HealthCheckResult>,
    pub(super) total_health_checks: u64,
    pub(super) total_errors: u64,
}
