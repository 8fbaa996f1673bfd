//! Alert manager implementation

use super::channels::{ConsoleChannel, EmailChannel, NotificationChannel, WebhookChannel};
use super::types::{Alert, AlertStats, AlertStorage};
use crate::config::MonitoringConfig;
use crate::monitoring::metrics::{BoundedPush, prune_before};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Alert manager: history, deduplication, resolution and delivery
#[derive(Debug)]
pub struct AlertManager {
    pub(super) storage: RwLock<AlertStorage>,
    channels: Vec<Arc<dyn NotificationChannel>>,
    retention: chrono::Duration,
    max_alerts: usize,
}

impl AlertManager {
    /// Create a manager with the console channel plus any configured webhook/email channel
    pub fn new(config: &MonitoringConfig, service: &str, environment: &str) -> Self {
        let mut channels: Vec<Arc<dyn NotificationChannel>> = vec![Arc::new(ConsoleChannel)];

        if let Some(url) = &config.channels.webhook_url {
            channels.push(Arc::new(WebhookChannel::new(
                url.clone(),
                service.to_string(),
                environment.to_string(),
            )));
        }

        if let (true, Some(api_url)) = (config.channels.email_enabled(), &config.channels.email_api_url) {
            channels.push(Arc::new(EmailChannel::new(
                api_url.clone(),
                config.channels.email_recipients.clone(),
                service.to_string(),
                environment.to_string(),
            )));
        }

        Self::with_channels(channels, config.retention(), config.max_alerts)
    }

    pub fn with_channels(
        channels: Vec<Arc<dyn NotificationChannel>>,
        retention: chrono::Duration,
        max_alerts: usize,
    ) -> Self {
        info!(
            channels = ?channels.iter().map(|c| c.name().to_string()).collect::<Vec<_>>(),
            "Alert manager configured"
        );
        Self {
            storage: RwLock::new(AlertStorage::default()),
            channels,
            retention,
            max_alerts: max_alerts.max(1),
        }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Store and deliver an alert
    ///
    /// Returns `None` when an unresolved alert with the same fingerprint is
    /// already open; nothing is stored or sent in that case.
    pub async fn raise(&self, alert: Alert) -> Option<Alert> {
        {
            let mut storage = self.storage.write();

            if let Some(fingerprint) = &alert.fingerprint {
                let open = storage
                    .alerts
                    .iter()
                    .any(|a| !a.resolved && a.fingerprint.as_ref() == Some(fingerprint));
                if open {
                    debug!(fingerprint = %fingerprint, "Alert condition already open");
                    storage.stats.deduplicated_alerts += 1;
                    return None;
                }
            }

            let cutoff = self.cutoff();
            storage.alerts.push_bounded(alert.clone(), self.max_alerts);
            prune_before(&mut storage.alerts, cutoff);

            storage.stats.total_alerts += 1;
            *storage
                .stats
                .alerts_by_type
                .entry(alert.alert_type.to_string())
                .or_insert(0) += 1;
            storage.stats.last_alert = Some(alert.timestamp);
        }

        self.notify(&alert).await;
        Some(alert)
    }

    /// Deliver to every channel accepting the alert type; failures are counted, not returned
    async fn notify(&self, alert: &Alert) {
        for channel in self.channels.iter().filter(|c| c.supports_type(alert.alert_type)) {
            match channel.send(alert).await {
                Ok(()) => debug!("Alert {} sent via {}", alert.id, channel.name()),
                Err(e) => {
                    warn!("Failed to send alert via {}: {}", channel.name(), e);
                    self.storage.write().stats.failed_notifications += 1;
                }
            }
        }
    }

    /// Resolve an open alert; false if unknown or already resolved
    pub fn resolve_alert(&self, id: &str) -> bool {
        let mut storage = self.storage.write();
        let now = Utc::now();
        let resolved = storage
            .alerts
            .iter_mut()
            .find(|a| a.id == id)
            .is_some_and(|a| a.resolve(now));

        if resolved {
            storage.stats.resolved_alerts += 1;
            info!("Alert {} resolved", id);
        }
        resolved
    }

    /// Resolve every open alert raised for a condition that has cleared
    pub fn resolve_by_fingerprint(&self, fingerprint: &str) -> usize {
        let mut storage = self.storage.write();
        let now = Utc::now();
        let resolved = storage
            .alerts
            .iter_mut()
            .filter(|a| a.fingerprint.as_deref() == Some(fingerprint))
            .filter_map(|a| a.resolve(now).then_some(()))
            .count();

        if resolved > 0 {
            storage.stats.resolved_alerts += resolved as u64;
            info!(fingerprint, "Auto-resolved {} alert(s)", resolved);
        }
        resolved
    }

    /// Most recent alerts first
    pub fn get_recent_alerts(&self, limit: usize) -> Vec<Alert> {
        self.storage
            .read()
            .alerts
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn get_alert(&self, id: &str) -> Option<Alert> {
        self.storage.read().alerts.iter().find(|a| a.id == id).cloned()
    }

    pub fn unresolved_count(&self) -> usize {
        self.storage.read().alerts.iter().filter(|a| !a.resolved).count()
    }

    pub fn stored_count(&self) -> usize {
        self.storage.read().alerts.len()
    }

    pub fn get_stats(&self) -> AlertStats {
        self.storage.read().stats.clone()
    }

    fn cutoff(&self) -> DateTime<Utc> {
        Utc::now()
            .checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Drop alerts past retention; returns how many were removed
    pub fn cleanup(&self) -> usize {
        let cutoff = self.cutoff();
        prune_before(&mut self.storage.write().alerts, cutoff)
    }
}
