//! Monitoring configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Monitoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Interval between composite health checks, in milliseconds
    #[serde(default = "default_health_check_interval_ms")]
    pub health_check_interval_ms: u64,
    /// Interval between retention sweeps, in milliseconds
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
    /// Days of health history, alerts and errors to keep
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    /// Metrics store retention window, in milliseconds
    #[serde(default = "default_metrics_retention_ms")]
    pub metrics_retention_ms: u64,
    #[serde(default = "default_max_points_per_series")]
    pub max_points_per_series: usize,
    /// Cap on each domain record log
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    #[serde(default = "default_max_records")]
    pub max_alerts: usize,
    #[serde(default = "default_max_records")]
    pub max_errors: usize,
    /// Alert thresholds
    #[serde(default)]
    pub thresholds: AlertThresholds,
    /// Notification channels
    #[serde(default)]
    pub channels: AlertChannelsConfig,
    /// Sibling services checked for configuration presence
    #[serde(default)]
    pub integrations: SiblingServicesConfig,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            health_check_interval_ms: default_health_check_interval_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            retention_days: default_retention_days(),
            metrics_retention_ms: default_metrics_retention_ms(),
            max_points_per_series: default_max_points_per_series(),
            max_records: default_max_records(),
            max_alerts: default_max_records(),
            max_errors: default_max_records(),
            thresholds: AlertThresholds::default(),
            channels: AlertChannelsConfig::default(),
            integrations: SiblingServicesConfig::default(),
        }
    }
}

impl MonitoringConfig {
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_millis(self.health_check_interval_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Retention window for health history, alerts and errors
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::try_days(i64::from(self.retention_days)).unwrap_or(chrono::Duration::MAX)
    }

    pub fn metrics_retention(&self) -> Duration {
        Duration::from_millis(self.metrics_retention_ms)
    }
}

/// Alert thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Error rate (0.0 - 1.0) above which a critical alert fires
    #[serde(default = "default_error_rate_threshold")]
    pub error_rate: f64,
    /// Average response time in milliseconds above which a warning fires
    #[serde(default = "default_response_time_threshold")]
    pub response_time_ms: f64,
    /// Process memory share (percent) above which a warning fires
    #[serde(default = "default_memory_threshold")]
    pub memory_usage_percent: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            error_rate: default_error_rate_threshold(),
            response_time_ms: default_response_time_threshold(),
            memory_usage_percent: default_memory_threshold(),
        }
    }
}

fn default_error_rate_threshold() -> f64 {
    0.1
}

fn default_response_time_threshold() -> f64 {
    5_000.0
}

fn default_memory_threshold() -> f64 {
    90.0
}

/// Notification channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AlertChannelsConfig {
    /// Webhook receiving every alert as JSON
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Email relay API endpoint
    #[serde(default)]
    pub email_api_url: Option<String>,
    #[serde(default)]
    pub email_recipients: Vec<String>,
}

impl AlertChannelsConfig {
    /// Email is only usable with both an endpoint and at least one recipient
    pub fn email_enabled(&self) -> bool {
        self.email_api_url.is_some() && !self.email_recipients.is_empty()
    }
}

/// Credentials and endpoints of sibling services
///
/// Only presence is checked; nothing here is ever called.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SiblingServicesConfig {
    /// AI provider name to API key
    #[serde(default)]
    pub ai_api_keys: HashMap<String, String>,
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub auth_anon_key: Option<String>,
    /// Integration platform name to credential
    #[serde(default)]
    pub integration_keys: HashMap<String, String>,
}

impl SiblingServicesConfig {
    /// Names of AI providers with a non-empty key, sorted
    pub fn configured_ai_providers(&self) -> Vec<String> {
        configured(&self.ai_api_keys)
    }

    pub fn auth_configured(&self) -> bool {
        present(&self.auth_url) && present(&self.auth_anon_key)
    }

    /// Names of integrations with a non-empty credential, sorted
    pub fn configured_integrations(&self) -> Vec<String> {
        configured(&self.integration_keys)
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

fn configured(keys: &HashMap<String, String>) -> Vec<String> {
    let mut names: Vec<String> = keys
        .iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, _)| k.clone())
        .collect();
    names.sort();
    names
}
