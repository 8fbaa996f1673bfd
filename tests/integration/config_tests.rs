//! Configuration loading and validation tests

#[cfg(test)]
mod tests {
    use contentplan_core::config::Validate;
    use contentplan_core::{CoreConfig, CoreError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_full_yaml_config() {
        let file = write_config(
            r#"
service_name: contentplan-api
environment: staging
database:
  url: "sqlite::memory:"
  pool_size: 4
resilience:
  max_consecutive_failures: 2
  circuit_breaker_timeout_ms: 5000
  retry_policies:
    database:
      max_attempts: 5
      base_delay_ms: 50
      max_delay_ms: 500
    publishing:
      max_attempts: 2
      base_delay_ms: 100
      max_delay_ms: 100
monitoring:
  health_check_interval_ms: 15000
  thresholds:
    response_time_ms: 750
    memory_usage_percent: 80
  channels:
    webhook_url: "https://hooks.example.com/contentplan"
    email_api_url: "https://mail.example.com/v1/send"
    email_recipients:
      - oncall@example.com
  integrations:
    ai_api_keys:
      openai: sk-test
    auth_url: "https://auth.example.com"
    auth_anon_key: anon
"#,
        );

        let config = CoreConfig::from_file(file.path()).await.unwrap();

        assert_eq!(config.service_name, "contentplan-api");
        assert_eq!(config.environment, "staging");
        assert!(config.database.is_sqlite());
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.resilience.circuit_breaker().failure_threshold, 2);
        assert_eq!(config.resilience.retry_policies["database"].max_attempts, 5);
        assert_eq!(config.resilience.retry_policies["publishing"].max_attempts, 2);
        assert_eq!(config.monitoring.thresholds.response_time_ms, 750.0);
        assert_eq!(config.monitoring.thresholds.error_rate, 0.1);
        assert!(config.monitoring.channels.email_enabled());
        assert!(config.monitoring.integrations.auth_configured());
        assert_eq!(
            config.monitoring.integrations.configured_ai_providers(),
            vec!["openai".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_file_uses_defaults() {
        let file = write_config("{}\n");
        let config = CoreConfig::from_file(file.path()).await.unwrap();

        assert_eq!(config.resilience.max_consecutive_failures, 5);
        assert_eq!(config.resilience.retry_policies.len(), 3);
        assert_eq!(config.monitoring.retention_days, 7);
    }

    #[tokio::test]
    async fn test_invalid_retry_policy_rejected() {
        let file = write_config(
            r#"
resilience:
  retry_policies:
    database:
      max_attempts: 3
      base_delay_ms: 5000
      max_delay_ms: 100
"#,
        );

        let err = CoreConfig::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.to_string().contains("Retry policy 'database'"));
    }

    #[tokio::test]
    async fn test_invalid_webhook_url_rejected() {
        let file = write_config(
            r#"
monitoring:
  channels:
    webhook_url: "ftp://hooks.example.com"
"#,
        );

        let err = CoreConfig::from_file(file.path()).await.unwrap_err();
        assert!(err.to_string().contains("Monitoring config error"));
    }

    #[test]
    fn test_database_validation() {
        let mut config = CoreConfig::default();
        config.database.pool_size = 0;
        assert!(config.database.validate().is_err());

        config.database.pool_size = 2;
        config.database.min_connections = 3;
        assert!(config.database.validate().is_err());

        config.database.min_connections = 1;
        config.database.url = "mysql://localhost/contentplan".to_string();
        assert!(config.database.validate().is_err());
    }
}
