//! Monitoring service end to end: metrics from managed queries through to the dashboard

#[cfg(test)]
mod tests {
    use crate::common::{CapturingChannel, MemoryDriver, fast_config, managed};
    use contentplan_core::monitoring::NotificationChannel;
    use contentplan_core::{
        AlertType, DatabaseProbe, ErrorContext, HealthStatus, MetricsStore, MonitoringService,
        QueryContext, SystemErrorKind,
    };
    use std::sync::Arc;
    use std::time::Duration;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_dashboard_combines_every_domain() {
        let driver = MemoryDriver::default();
        let mut config = fast_config();
        config
            .monitoring
            .integrations
            .ai_api_keys
            .insert("anthropic".into(), "key".into());
        config.monitoring.integrations.auth_url = Some("https://auth.example.com".into());
        config.monitoring.integrations.auth_anon_key = Some("anon".into());

        let metrics = Arc::new(MetricsStore::new(&config.monitoring));
        let db = managed(&driver, &config, Arc::clone(&metrics)).await;
        let probe: Arc<dyn DatabaseProbe> = Arc::new(db.clone());
        let service = MonitoringService::new(&config, Arc::clone(&metrics), Some(probe));

        db.execute_query(&QueryContext::new("list_posts").with_resource("posts"), |pool| async move {
            pool.get("anything").await
        })
        .await
        .unwrap();
        metrics.record_api_response_time("/api/posts", "GET", 150.0, 200);
        metrics.record_api_response_time("/api/posts", "POST", 250.0, 500);
        metrics.record_ai_service_metrics("anthropic", Some("claude-sonnet"), 1200.0, 350, 0.004, true);
        metrics.record_integration_metrics("linkedin", "publish", 400.0, false);

        let health = service.perform_health_check().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.components["database"].healthy);

        let dashboard = service.get_dashboard_data(HOUR);
        assert_eq!(dashboard.api_overview.stats.total, 2);
        assert_eq!(dashboard.api_overview.stats.avg_response_time, 200.0);
        assert_eq!(dashboard.api_overview.stats.error_rate, 0.5);
        assert_eq!(dashboard.api_overview.by_endpoint["/api/posts"].count, 2);

        assert_eq!(dashboard.database_overview.stats.total, 1);
        assert!(dashboard.database_overview.by_operation.contains_key("list_posts"));

        assert_eq!(dashboard.ai_overview.total_tokens, 350);
        assert_eq!(dashboard.integration_overview.stats.error_rate, 1.0);
        assert_eq!(dashboard.stats.total_health_checks, 1);
        assert_eq!(dashboard.health.map(|h| h.status), Some(HealthStatus::Healthy));

        let json = serde_json::to_value(service.get_dashboard_data(HOUR)).unwrap();
        assert_eq!(json["api_overview"]["by_endpoint"]["/api/posts"]["count"], 2);
    }

    #[tokio::test]
    async fn test_store_outage_pages_once_and_clears() {
        let driver = MemoryDriver::default();
        let config = fast_config();
        let metrics = Arc::new(MetricsStore::new(&config.monitoring));
        let db = managed(&driver, &config, Arc::clone(&metrics)).await;
        let channel = Arc::new(CapturingChannel::default());
        let service = MonitoringService::new(&config, metrics, Some(Arc::new(db) as Arc<dyn DatabaseProbe>))
            .with_alert_channels(vec![channel.clone() as Arc<dyn NotificationChannel>]);

        driver.set_ping_fails(true);
        for _ in 0..3 {
            service.perform_health_check().await;
        }
        let critical: Vec<_> = channel
            .alerts
            .lock()
            .iter()
            .filter(|a| a.alert_type == AlertType::Critical)
            .cloned()
            .collect();
        assert_eq!(critical.len(), 1);
        assert!(critical[0].message.contains("database"));

        driver.set_ping_fails(false);
        service.perform_health_check().await;
        let unhealthy = service
            .get_recent_alerts(50)
            .into_iter()
            .find(|a| a.fingerprint.as_deref() == Some("status:unhealthy"))
            .unwrap();
        assert!(unhealthy.resolved);
    }

    #[tokio::test]
    async fn test_errors_and_alerts_listing() {
        let config = fast_config();
        let service = MonitoringService::new(&config, Arc::new(MetricsStore::new(&config.monitoring)), None)
            .with_alert_channels(Vec::new());

        let entry = service
            .record_error(
                SystemErrorKind::Authentication,
                "Token refresh rejected",
                None,
                ErrorContext::default().with_request("req-7"),
            )
            .await;

        let alerts = service.get_recent_alerts(10);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::Critical);
        assert!(service.resolve_alert(&alerts[0].id));

        let errors = service.get_recent_errors(10);
        assert_eq!(errors[0].id, entry.id);
        assert_eq!(errors[0].request_id.as_deref(), Some("req-7"));

        let json = serde_json::to_value(&errors[0]).unwrap();
        assert_eq!(json["type"], "authentication");
    }
}
