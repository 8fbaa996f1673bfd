//! Core MonitoringService implementation

use super::alerts::{Alert, AlertManager, AlertType, NotificationChannel};
use super::health::{HealthCheckResult, HealthChecker, HealthReport, HealthStatus};
use super::metrics::{BoundedPush, MetricsStore, names, prune_before};
use super::types::{
    DashboardData, ErrorContext, HealthMetricsRecord, MonitoringStats, MonitoringStorage,
    SystemError, SystemErrorKind,
};
use crate::config::{CoreConfig, MonitoringConfig};
use crate::storage::DatabaseProbe;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Build version reported by the health endpoint
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "+", env!("GIT_HASH"));

const FINGERPRINT_ERROR_RATE: &str = "threshold:error_rate";
const FINGERPRINT_RESPONSE_TIME: &str = "threshold:response_time";
const FINGERPRINT_MEMORY: &str = "threshold:memory_usage";
const FINGERPRINT_UNHEALTHY: &str = "status:unhealthy";
const FINGERPRINT_DEGRADED: &str = "status:degraded";

/// Periodic health evaluation, alert lifecycle and dashboard aggregation
pub struct MonitoringService {
    pub(super) config: MonitoringConfig,
    pub(super) metrics: Arc<MetricsStore>,
    pub(super) alerts: AlertManager,
    pub(super) checker: HealthChecker,
    pub(super) storage: RwLock<MonitoringStorage>,
    pub(super) started_at: Instant,
    pub(super) tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for MonitoringService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitoringService")
            .field("checker", &self.checker)
            .field("alerts", &self.alerts)
            .finish()
    }
}

impl MonitoringService {
    /// Create the service; `database` is probed by every health check when present
    pub fn new(
        config: &CoreConfig,
        metrics: Arc<MetricsStore>,
        database: Option<Arc<dyn DatabaseProbe>>,
    ) -> Self {
        let monitoring = config.monitoring.clone();
        info!("Initializing monitoring service");

        let alerts = AlertManager::new(&monitoring, &config.service_name, &config.environment);
        let checker = HealthChecker::new(
            database,
            monitoring.integrations.clone(),
            monitoring.thresholds.memory_usage_percent,
        );

        Self {
            config: monitoring,
            metrics,
            alerts,
            checker,
            storage: RwLock::new(MonitoringStorage::default()),
            started_at: Instant::now(),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Replace the configured notification channels
    pub fn with_alert_channels(mut self, channels: Vec<Arc<dyn NotificationChannel>>) -> Self {
        self.alerts = AlertManager::with_channels(channels, self.config.retention(), self.config.max_alerts);
        self
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    pub fn alerts(&self) -> &AlertManager {
        &self.alerts
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn retention_cutoff(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_sub_signed(self.config.retention())
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Run every component check, record the outcome and evaluate alert thresholds
    pub async fn perform_health_check(&self) -> HealthCheckResult {
        let result = self.checker.check_all().await;

        self.metrics.record_metric(
            names::HEALTH_RESPONSE_TIME,
            result.response_time_ms as f64,
            None,
            Some("ms"),
        );
        if let Some(memory) = result.memory_usage_percent {
            self.metrics
                .record_metric(names::MEMORY_USAGE, memory, None, Some("percent"));
        }

        {
            let cutoff = self.retention_cutoff();
            let mut storage = self.storage.write();
            storage
                .health_history
                .push_bounded(HealthMetricsRecord::from(&result), self.config.max_records);
            prune_before(&mut storage.health_history, cutoff);
            storage.total_health_checks += 1;
            storage.last_health = Some(result.clone());
        }

        self.evaluate_thresholds(&result).await;
        result
    }

    /// Raise alerts for breached thresholds and resolve the ones that cleared
    async fn evaluate_thresholds(&self, result: &HealthCheckResult) {
        let thresholds = &self.config.thresholds;

        let error_rate_breached = result.error_rate > thresholds.error_rate;
        self.threshold_alert(
            error_rate_breached,
            FINGERPRINT_ERROR_RATE,
            || {
                Alert::new(
                    AlertType::Warning,
                    "High health check error rate",
                    format!(
                        "{} of {} health checks failing ({:.0}%)",
                        result.failed_checks,
                        result.total_checks,
                        result.error_rate * 100.0
                    ),
                )
                .with_metadata("error_rate", json!(result.error_rate))
                .with_metadata("threshold", json!(thresholds.error_rate))
            },
        )
        .await;

        let window = self.config.health_check_interval().max(Duration::from_secs(60));
        let api = self.metrics.api_overview(window);
        let slow = api.stats.total > 0 && api.stats.avg_response_time > thresholds.response_time_ms;
        self.threshold_alert(slow, FINGERPRINT_RESPONSE_TIME, || {
            Alert::new(
                AlertType::Warning,
                "Slow API responses",
                format!(
                    "Average API response time {:.0} ms exceeds {:.0} ms",
                    api.stats.avg_response_time, thresholds.response_time_ms
                ),
            )
            .with_metadata("avg_response_time", json!(api.stats.avg_response_time))
            .with_metadata("threshold", json!(thresholds.response_time_ms))
        })
        .await;

        let memory_breached = result
            .memory_usage_percent
            .is_some_and(|m| m > thresholds.memory_usage_percent);
        self.threshold_alert(memory_breached, FINGERPRINT_MEMORY, || {
            let usage = result.memory_usage_percent.unwrap_or_default();
            Alert::new(
                AlertType::Warning,
                "High memory usage",
                format!("Process memory at {:.1}%", usage),
            )
            .with_metadata("memory_usage_percent", json!(usage))
            .with_metadata("threshold", json!(thresholds.memory_usage_percent))
        })
        .await;

        let failing: Vec<&str> = result
            .components
            .values()
            .filter(|c| !c.healthy)
            .map(|c| c.name.as_str())
            .collect();
        self.threshold_alert(
            result.status == HealthStatus::Unhealthy,
            FINGERPRINT_UNHEALTHY,
            || {
                Alert::new(
                    AlertType::Critical,
                    "System unhealthy",
                    format!("Failing checks: {}", failing.join(", ")),
                )
                .with_metadata("failing_checks", json!(failing))
            },
        )
        .await;
        self.threshold_alert(
            result.status == HealthStatus::Degraded,
            FINGERPRINT_DEGRADED,
            || {
                Alert::new(
                    AlertType::Warning,
                    "System degraded",
                    format!("Failing checks: {}", failing.join(", ")),
                )
                .with_metadata("failing_checks", json!(failing))
            },
        )
        .await;
    }

    async fn threshold_alert(&self, breached: bool, fingerprint: &str, build: impl FnOnce() -> Alert) {
        if breached {
            self.alerts.raise(build().with_fingerprint(fingerprint)).await;
        } else {
            self.alerts.resolve_by_fingerprint(fingerprint);
        }
    }

    /// Log an application error and raise an alert for it
    ///
    /// The cause chain of `error`, if given, is kept as the entry's stack.
    pub async fn record_error(
        &self,
        kind: SystemErrorKind,
        message: &str,
        error: Option<&(dyn std::error::Error + Send + Sync + 'static)>,
        context: ErrorContext,
    ) -> SystemError {
        let entry = SystemError {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            message: message.to_string(),
            stack: error.map(|e| render_cause_chain(e)),
            timestamp: Utc::now(),
            user_id: context.user_id,
            request_id: context.request_id,
            metadata: context.metadata,
        };
        error!(
            error_id = %entry.id,
            kind = %kind,
            request_id = ?entry.request_id,
            "{}",
            message
        );

        {
            let cutoff = self.retention_cutoff();
            let mut storage = self.storage.write();
            storage.errors.push_bounded(entry.clone(), self.config.max_errors);
            prune_before(&mut storage.errors, cutoff);
            storage.total_errors += 1;
        }

        let mut alert = Alert::new(kind.alert_type(), format!("{} error", kind), message)
            .with_metadata("error_id", json!(entry.id))
            .with_metadata("type", json!(kind));
        if let Some(request_id) = &entry.request_id {
            alert = alert.with_metadata("request_id", json!(request_id));
        }
        self.alerts.raise(alert).await;

        entry
    }

    /// Most recent errors first
    pub fn get_recent_errors(&self, limit: usize) -> Vec<SystemError> {
        self.storage
            .read()
            .errors
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn get_recent_alerts(&self, limit: usize) -> Vec<Alert> {
        self.alerts.get_recent_alerts(limit)
    }

    pub fn resolve_alert(&self, id: &str) -> bool {
        self.alerts.resolve_alert(id)
    }

    /// Recent health check records, oldest first
    pub fn health_history(&self) -> Vec<HealthMetricsRecord> {
        self.storage.read().health_history.iter().cloned().collect()
    }

    pub fn last_health(&self) -> Option<HealthCheckResult> {
        self.storage.read().last_health.clone()
    }

    pub fn get_monitoring_stats(&self) -> MonitoringStats {
        let storage = self.storage.read();
        let mut errors_by_type = BTreeMap::new();
        for entry in &storage.errors {
            *errors_by_type.entry(entry.kind.to_string()).or_insert(0) += 1;
        }

        MonitoringStats {
            uptime_seconds: self.uptime().as_secs(),
            current_status: storage.last_health.as_ref().map(|h| h.status),
            last_health_check: storage.last_health.as_ref().map(|h| h.timestamp),
            total_health_checks: storage.total_health_checks,
            health_records: storage.health_history.len(),
            active_alerts: self.alerts.unresolved_count(),
            total_errors: storage.total_errors,
            errors_by_type,
            alerts: self.alerts.get_stats(),
            metric_series: self.metrics.series_count(),
        }
    }

    /// Health, stats, metric summaries and per-domain overviews over the last `window`
    pub fn get_dashboard_data(&self, window: Duration) -> DashboardData {
        debug!(window_ms = window.as_millis() as u64, "Building dashboard data");
        DashboardData {
            generated_at: Utc::now(),
            window_ms: window.as_millis() as u64,
            health: self.last_health(),
            stats: self.get_monitoring_stats(),
            metrics: self.metrics.get_metrics_summary(window),
            api_overview: self.metrics.api_overview(window),
            database_overview: self.metrics.database_overview(window),
            ai_overview: self.metrics.ai_overview(window),
            integration_overview: self.metrics.integration_overview(window),
            recent_alerts: self.get_recent_alerts(10),
            recent_errors: self.get_recent_errors(10),
        }
    }

    /// Fresh health check rendered for the health endpoint
    pub async fn health_report(&self) -> HealthReport {
        let result = self.perform_health_check().await;
        HealthReport {
            status: result.status,
            timestamp: result.timestamp,
            uptime_seconds: self.uptime().as_secs(),
            version: VERSION.to_string(),
            checks: result.components,
        }
    }

    /// Drop health records, errors, alerts and metric points past retention
    pub fn cleanup(&self) -> usize {
        let cutoff = self.retention_cutoff();
        let removed = {
            let mut storage = self.storage.write();
            prune_before(&mut storage.health_history, cutoff) + prune_before(&mut storage.errors, cutoff)
        };
        let removed = removed + self.alerts.cleanup() + self.metrics.cleanup();

        if removed > 0 {
            info!("Monitoring cleanup removed {} expired entries", removed);
        }
        removed
    }
}

fn render_cause_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str("\n  caused by: ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
