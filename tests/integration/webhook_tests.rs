//! Notification delivery against a mock HTTP server

#[cfg(test)]
mod tests {
    use crate::common::fast_config;
    use contentplan_core::{CoreConfig, ErrorContext, MetricsStore, MonitoringService, SystemErrorKind};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_with_channels(webhook: Option<String>, email: Option<String>) -> MonitoringService {
        service_with(webhook, email, |_| {})
    }

    fn service_with(
        webhook: Option<String>,
        email: Option<String>,
        configure: impl FnOnce(&mut CoreConfig),
    ) -> MonitoringService {
        let mut config = fast_config();
        config.service_name = "contentplan-api".to_string();
        config.environment = "staging".to_string();
        config.monitoring.channels.webhook_url = webhook;
        if let Some(api_url) = email {
            config.monitoring.channels.email_api_url = Some(api_url);
            config.monitoring.channels.email_recipients = vec!["oncall@example.com".to_string()];
        }
        configure(&mut config);
        MonitoringService::new(&config, Arc::new(MetricsStore::new(&config.monitoring)), None)
    }

    #[tokio::test]
    async fn test_webhook_receives_alert_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/alerts"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_with_channels(Some(format!("{}/alerts", server.uri())), None);
        assert_eq!(service.alerts().channel_names(), vec!["console", "webhook"]);

        service
            .record_error(
                SystemErrorKind::Integration,
                "LinkedIn publish failed",
                None,
                ErrorContext::default(),
            )
            .await;

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["service"], "contentplan-api");
        assert_eq!(body["environment"], "staging");
        assert_eq!(body["alert"]["type"], "error");
        assert_eq!(body["alert"]["title"], "integration error");
        assert_eq!(body["alert"]["message"], "LinkedIn publish failed");
        assert_eq!(service.alerts().get_stats().failed_notifications, 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_is_counted_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let service = service_with_channels(Some(server.uri()), None);
        let entry = service
            .record_error(SystemErrorKind::Application, "Render failed", None, ErrorContext::default())
            .await;

        assert_eq!(service.get_recent_errors(1)[0].id, entry.id);
        let stats = service.alerts().get_stats();
        assert_eq!(stats.total_alerts, 1);
        assert_eq!(stats.failed_notifications, 1);
    }

    #[tokio::test]
    async fn test_email_relay_only_for_severe_alerts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(body_partial_json(json!({ "to": ["oncall@example.com"] })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        // Only the database check fails, so the health run stays healthy but breaches the error rate
        let service = service_with(None, Some(format!("{}/send", server.uri())), |config| {
            let services = &mut config.monitoring.integrations;
            services.ai_api_keys.insert("openai".into(), "sk-test".into());
            services.auth_url = Some("https://auth.example.com".into());
            services.auth_anon_key = Some("anon".into());
        });

        // Critical: delivered by email
        service
            .record_error(SystemErrorKind::Database, "Pool exhausted", None, ErrorContext::default())
            .await;
        // Threshold warnings stay off the email relay
        service.perform_health_check().await;
        assert_eq!(service.get_monitoring_stats().active_alerts, 2);

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let subject = body["subject"].as_str().unwrap();
        assert!(subject.starts_with("[staging] contentplan-api"));
        assert!(subject.contains("CRITICAL: database error"));
    }
}
