//! Configuration loading utilities
//!
//! This module provides utilities for loading configuration from environment variables.

use super::CoreConfig;
use crate::utils::error::{CoreError, Result};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Sibling AI providers and the variables carrying their keys
const AI_KEY_VARS: &[(&str, &str)] = &[("openai", "OPENAI_API_KEY"), ("anthropic", "ANTHROPIC_API_KEY")];

/// Integration platforms and the variables carrying their credentials
const INTEGRATION_KEY_VARS: &[(&str, &str)] = &[("twitter", "TWITTER_API_KEY"), ("linkedin", "LINKEDIN_CLIENT_ID")];

impl CoreConfig {
    /// Overlay environment variables onto this configuration
    pub fn apply_env(mut self) -> Result<Self> {
        debug!("Loading configuration from environment variables");

        // Database configuration
        if let Some(url) = var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(size) = parse_var("DATABASE_POOL_SIZE")? {
            self.database.pool_size = size;
        }
        if let Some(ms) = parse_var("DATABASE_IDLE_TIMEOUT_MS")? {
            self.database.idle_timeout_ms = ms;
        }
        if let Some(ms) = parse_var("DATABASE_CONNECT_TIMEOUT_MS")? {
            self.database.connect_timeout_ms = ms;
        }

        // Database retry policy and failure limit
        let database_policy = self
            .resilience
            .retry_policies
            .entry(crate::utils::error::recovery::DEFAULT_POLICY.to_string())
            .or_default();
        if let Some(retries) = parse_var("DATABASE_MAX_RETRIES")? {
            database_policy.max_attempts = retries;
        }
        if let Some(ms) = parse_var("DATABASE_RETRY_DELAY_MS")? {
            database_policy.base_delay_ms = ms;
        }
        if let Some(ms) = parse_var("DATABASE_MAX_RETRY_DELAY_MS")? {
            database_policy.max_delay_ms = ms;
        }
        if let Some(failures) = parse_var("DATABASE_MAX_CONSECUTIVE_FAILURES")? {
            self.resilience.max_consecutive_failures = failures;
        }

        // Alert channels
        if let Some(url) = var("ALERT_WEBHOOK_URL") {
            self.monitoring.channels.webhook_url = Some(url);
        }
        if let Some(url) = var("ALERT_EMAIL_API_URL") {
            self.monitoring.channels.email_api_url = Some(url);
        }
        if let Some(recipients) = var("ALERT_EMAIL_RECIPIENTS") {
            self.monitoring.channels.email_recipients = recipients
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(days) = parse_var("MONITORING_RETENTION_DAYS")? {
            self.monitoring.retention_days = days;
        }

        if let Some(environment) = var("APP_ENV") {
            self.environment = environment;
        }

        // Sibling services, presence only
        let integrations = &mut self.monitoring.integrations;
        for (provider, key) in AI_KEY_VARS {
            if let Some(value) = var(key) {
                integrations.ai_api_keys.insert(provider.to_string(), value);
            }
        }
        if let Some(url) = var("AUTH_URL") {
            integrations.auth_url = Some(url);
        }
        if let Some(key) = var("AUTH_ANON_KEY") {
            integrations.auth_anon_key = Some(key);
        }
        for (platform, key) in INTEGRATION_KEY_VARS {
            if let Some(value) = var(key) {
                integrations.integration_keys.insert(platform.to_string(), value);
            }
        }

        debug!("Configuration loaded from environment variables");
        Ok(self)
    }
}

/// Non-empty environment variable
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CoreError::Config(format!("Invalid {}: {}", key, e))),
        None => Ok(None),
    }
}
