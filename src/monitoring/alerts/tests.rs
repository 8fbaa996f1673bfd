//! Alert system tests

#[cfg(test)]
mod tests {
    use super::super::channels::NotificationChannel;
    use super::super::types::{Alert, AlertType};
    use super::super::AlertManager;
    use crate::config::MonitoringConfig;
    use crate::utils::error::{CoreError, Result};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct RecordingChannel {
        sent: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn send(&self, _alert: &Alert) -> Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CoreError::alert("relay rejected the message"));
            }
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn supports_type(&self, alert_type: AlertType) -> bool {
            alert_type >= AlertType::Warning
        }
    }

    fn manager_with(channel: Arc<RecordingChannel>, max_alerts: usize) -> AlertManager {
        AlertManager::with_channels(vec![channel], chrono::Duration::days(7), max_alerts)
    }

    // ==================== Alert Type Tests ====================

    #[test]
    fn test_alert_serializes_type_lowercase() {
        let alert = Alert::new(AlertType::Critical, "Database down", "no route to host");
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "critical");
        assert_eq!(json["resolved"], false);
        assert!(json["resolved_at"].is_null());
        assert!(json.get("fingerprint").is_none());
    }

    #[test]
    fn test_alert_type_ordering() {
        assert!(AlertType::Critical > AlertType::Error);
        assert!(AlertType::Error > AlertType::Warning);
        assert!(AlertType::Warning > AlertType::Info);
    }

    // ==================== Manager Tests ====================

    #[test]
    fn test_default_channels_from_config() {
        let manager = AlertManager::new(&MonitoringConfig::default(), "contentplan", "test");
        assert_eq!(manager.channel_names(), vec!["console"]);

        let mut config = MonitoringConfig::default();
        config.channels.webhook_url = Some("https://hooks.example.com/alerts".to_string());
        config.channels.email_api_url = Some("https://mail.example.com/send".to_string());
        config.channels.email_recipients = vec!["ops@example.com".to_string()];
        let manager = AlertManager::new(&config, "contentplan", "test");
        assert_eq!(manager.channel_names(), vec!["console", "webhook", "email"]);
    }

    #[test]
    fn test_email_channel_needs_recipients() {
        let mut config = MonitoringConfig::default();
        config.channels.email_api_url = Some("https://mail.example.com/send".to_string());
        let manager = AlertManager::new(&config, "contentplan", "test");
        assert_eq!(manager.channel_names(), vec!["console"]);
    }

    #[tokio::test]
    async fn test_resolve_alert_is_idempotent() {
        let manager = manager_with(Arc::new(RecordingChannel::default()), 100);
        let alert = manager
            .raise(Alert::new(AlertType::Error, "Query failures", "3 failures"))
            .await
            .unwrap();

        assert!(manager.resolve_alert(&alert.id));
        let resolved_at = manager.get_alert(&alert.id).unwrap().resolved_at;
        assert!(resolved_at.is_some());

        assert!(!manager.resolve_alert(&alert.id));
        let stored = manager.get_alert(&alert.id).unwrap();
        assert!(stored.resolved);
        assert_eq!(stored.resolved_at, resolved_at);
        assert_eq!(manager.get_stats().resolved_alerts, 1);
    }

    #[tokio::test]
    async fn test_resolve_unknown_alert() {
        let manager = manager_with(Arc::new(RecordingChannel::default()), 100);
        assert!(!manager.resolve_alert("missing"));
    }

    #[tokio::test]
    async fn test_delivery_respects_channel_types() {
        let channel = Arc::new(RecordingChannel::default());
        let manager = manager_with(channel.clone(), 100);

        manager.raise(Alert::new(AlertType::Info, "FYI", "")).await;
        manager.raise(Alert::new(AlertType::Warning, "Slow", "")).await;

        assert_eq!(channel.sent.load(Ordering::SeqCst), 1);
        assert_eq!(manager.get_stats().total_alerts, 2);
    }

    #[tokio::test]
    async fn test_channel_failures_are_counted_not_raised() {
        let channel = Arc::new(RecordingChannel {
            sent: AtomicUsize::new(0),
            fail: true,
        });
        let manager = manager_with(channel, 100);

        let raised = manager
            .raise(Alert::new(AlertType::Critical, "Database down", ""))
            .await;

        assert!(raised.is_some());
        assert_eq!(manager.stored_count(), 1);
        assert_eq!(manager.get_stats().failed_notifications, 1);
    }

    #[tokio::test]
    async fn test_fingerprint_dedupes_until_resolved() {
        let manager = manager_with(Arc::new(RecordingChannel::default()), 100);
        let first = Alert::new(AlertType::Warning, "High error rate", "").with_fingerprint("threshold:error_rate");
        let second = Alert::new(AlertType::Warning, "High error rate", "").with_fingerprint("threshold:error_rate");

        assert!(manager.raise(first).await.is_some());
        assert!(manager.raise(second).await.is_none());
        assert_eq!(manager.unresolved_count(), 1);
        assert_eq!(manager.get_stats().deduplicated_alerts, 1);

        assert_eq!(manager.resolve_by_fingerprint("threshold:error_rate"), 1);
        assert_eq!(manager.unresolved_count(), 0);

        let again = Alert::new(AlertType::Warning, "High error rate", "").with_fingerprint("threshold:error_rate");
        assert!(manager.raise(again).await.is_some());
        assert_eq!(manager.stored_count(), 2);
    }

    #[tokio::test]
    async fn test_recent_alerts_newest_first_and_bounded() {
        let manager = manager_with(Arc::new(RecordingChannel::default()), 3);
        for i in 0..5 {
            manager
                .raise(Alert::new(AlertType::Info, format!("alert {}", i), ""))
                .await;
        }

        let recent = manager.get_recent_alerts(10);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].title, "alert 4");
        assert_eq!(recent[2].title, "alert 2");
        assert_eq!(manager.get_recent_alerts(1).len(), 1);
        assert_eq!(manager.get_stats().total_alerts, 5);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_alerts() {
        let manager = manager_with(Arc::new(RecordingChannel::default()), 100);
        let mut old = Alert::new(AlertType::Info, "old", "");
        old.timestamp = chrono::Utc::now() - chrono::Duration::days(8);
        manager.storage.write().alerts.push_back(old);
        manager.raise(Alert::new(AlertType::Info, "new", "")).await;

        // raise prunes at write time
        assert_eq!(manager.stored_count(), 1);
        assert_eq!(manager.cleanup(), 0);
        assert_eq!(manager.get_recent_alerts(10)[0].title, "new");
    }
}
