//! Test fixtures

use super::driver::MemoryDriver;
use contentplan_core::monitoring::NotificationChannel;
use contentplan_core::{Alert, AlertType, ConnectionManager, CoreConfig, MetricsStore, Result, RetryConfig};
use parking_lot::Mutex;
use std::sync::Arc;

/// Defaults with short, jitter-free retry delays and a three-failure breaker
pub fn fast_config() -> CoreConfig {
    let mut config = CoreConfig::default();
    config.resilience.max_consecutive_failures = 3;
    config.resilience.circuit_breaker_timeout_ms = 60_000;
    config.resilience.max_reconnect_attempts = 2;
    config.resilience.reconnect_base_delay_ms = 10;
    config.resilience.reconnect_max_delay_ms = 20;
    for name in ["database", "ai_service", "integration"] {
        config
            .resilience
            .retry_policies
            .insert(name.to_string(), RetryConfig::new(3, 10, 100).without_jitter());
    }
    config
}

/// A connected manager over `driver` sharing `metrics`
pub async fn managed(
    driver: &MemoryDriver,
    config: &CoreConfig,
    metrics: Arc<MetricsStore>,
) -> ConnectionManager<MemoryDriver> {
    let manager = ConnectionManager::new(
        driver.clone(),
        config.database.clone(),
        config.resilience.clone(),
        metrics,
    );
    manager
        .initialize()
        .await
        .expect("memory driver connects on first attempt");
    manager
}

/// Keeps every alert it receives
#[derive(Debug, Default)]
pub struct CapturingChannel {
    pub alerts: Mutex<Vec<Alert>>,
}

#[async_trait::async_trait]
impl NotificationChannel for CapturingChannel {
    async fn send(&self, alert: &Alert) -> Result<()> {
        self.alerts.lock().push(alert.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "capturing"
    }

    fn supports_type(&self, _alert_type: AlertType) -> bool {
        true
    }
}
