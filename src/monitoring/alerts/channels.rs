//! Notification channels for alerts

use super::types::{Alert, AlertType};
use crate::utils::error::{CoreError, Result};
use std::time::Duration;
use tracing::{error, info, warn};

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Notification channel trait
#[async_trait::async_trait]
pub trait NotificationChannel: Send + Sync + std::fmt::Debug {
    /// Send an alert notification
    async fn send(&self, alert: &Alert) -> Result<()>;

    /// Get channel name
    fn name(&self) -> &str;

    /// Check if channel supports this alert type
    fn supports_type(&self, alert_type: AlertType) -> bool;
}

/// Writes alerts to the log; always installed
#[derive(Debug, Default)]
pub struct ConsoleChannel;

#[async_trait::async_trait]
impl NotificationChannel for ConsoleChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        match alert.alert_type {
            AlertType::Critical | AlertType::Error => {
                error!(alert_id = %alert.id, kind = %alert.alert_type, "{}: {}", alert.title, alert.message)
            }
            AlertType::Warning => {
                warn!(alert_id = %alert.id, kind = %alert.alert_type, "{}: {}", alert.title, alert.message)
            }
            AlertType::Info => {
                info!(alert_id = %alert.id, kind = %alert.alert_type, "{}: {}", alert.title, alert.message)
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }

    fn supports_type(&self, _alert_type: AlertType) -> bool {
        true
    }
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(DELIVERY_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

async fn post_json(client: &reqwest::Client, url: &str, payload: &serde_json::Value, channel: &str) -> Result<()> {
    let response = client.post(url).json(payload).send().await?;

    if !response.status().is_success() {
        return Err(CoreError::alert(format!(
            "{} notification failed with status: {}",
            channel,
            response.status()
        )));
    }

    Ok(())
}

/// Posts `{alert, service, environment}` as JSON to a webhook
#[derive(Debug)]
pub struct WebhookChannel {
    pub(super) url: String,
    service: String,
    environment: String,
    client: reqwest::Client,
}

impl WebhookChannel {
    pub fn new(url: String, service: String, environment: String) -> Self {
        Self {
            url,
            service,
            environment,
            client: build_client(),
        }
    }
}

#[async_trait::async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let payload = serde_json::json!({
            "alert": alert,
            "service": self.service,
            "environment": self.environment,
        });
        post_json(&self.client, &self.url, &payload, self.name()).await
    }

    fn name(&self) -> &str {
        "webhook"
    }

    fn supports_type(&self, _alert_type: AlertType) -> bool {
        true
    }
}

/// Sends errors and criticals to recipients through an email relay API
#[derive(Debug)]
pub struct EmailChannel {
    pub(super) api_url: String,
    pub(super) recipients: Vec<String>,
    service: String,
    environment: String,
    client: reqwest::Client,
}

impl EmailChannel {
    pub fn new(api_url: String, recipients: Vec<String>, service: String, environment: String) -> Self {
        Self {
            api_url,
            recipients,
            service,
            environment,
            client: build_client(),
        }
    }

    fn subject(&self, alert: &Alert) -> String {
        format!(
            "[{}] {} {}: {}",
            self.environment,
            self.service,
            alert.alert_type.as_str().to_uppercase(),
            alert.title
        )
    }
}

#[async_trait::async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        let payload = serde_json::json!({
            "to": self.recipients,
            "subject": self.subject(alert),
            "text": alert.message,
            "alert": alert,
        });
        post_json(&self.client, &self.api_url, &payload, self.name()).await
    }

    fn name(&self) -> &str {
        "email"
    }

    fn supports_type(&self, alert_type: AlertType) -> bool {
        alert_type >= AlertType::Error
    }
}
