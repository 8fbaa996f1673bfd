//! Monitoring configuration validators
//!
//! This module provides validation implementations for MonitoringConfig,
//! AlertThresholds and AlertChannelsConfig.

use super::trait_def::Validate;
use crate::config::models::*;
use tracing::debug;

impl Validate for MonitoringConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating monitoring configuration");

        if self.retention_days == 0 {
            return Err("Retention days must be at least 1".to_string());
        }

        if self.health_check_interval_ms == 0 {
            return Err("Health check interval must be greater than 0".to_string());
        }

        if self.cleanup_interval_ms == 0 {
            return Err("Cleanup interval must be greater than 0".to_string());
        }

        if self.metrics_retention_ms == 0 {
            return Err("Metrics retention must be greater than 0".to_string());
        }

        if self.max_points_per_series == 0 || self.max_records == 0 {
            return Err("Metrics capacity limits must be greater than 0".to_string());
        }

        if self.max_alerts == 0 || self.max_errors == 0 {
            return Err("Alert and error capacity limits must be greater than 0".to_string());
        }

        self.thresholds.validate()?;
        self.channels.validate()?;

        Ok(())
    }
}

impl Validate for AlertThresholds {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(format!(
                "Error rate threshold must be between 0.0 and 1.0, got {}",
                self.error_rate
            ));
        }

        if self.response_time_ms <= 0.0 {
            return Err("Response time threshold must be greater than 0".to_string());
        }

        if self.memory_usage_percent <= 0.0 || self.memory_usage_percent > 100.0 {
            return Err(format!(
                "Memory usage threshold must be in (0, 100], got {}",
                self.memory_usage_percent
            ));
        }

        Ok(())
    }
}

impl Validate for AlertChannelsConfig {
    fn validate(&self) -> Result<(), String> {
        if let Some(webhook) = &self.webhook_url {
            validate_http_url(webhook).map_err(|e| format!("Webhook URL: {}", e))?;
        }

        if let Some(email_api) = &self.email_api_url {
            validate_http_url(email_api).map_err(|e| format!("Email API URL: {}", e))?;
        }

        for recipient in &self.email_recipients {
            if !recipient.contains('@') {
                return Err(format!("Invalid email recipient: {}", recipient));
            }
        }

        Ok(())
    }
}

/// Check that a URL parses and uses http or https
pub fn validate_http_url(raw: &str) -> Result<(), String> {
    let parsed = url::Url::parse(raw).map_err(|e| format!("invalid URL '{}': {}", raw, e))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }

    if parsed.host_str().is_none() {
        return Err(format!("URL '{}' has no host", raw));
    }

    Ok(())
}
