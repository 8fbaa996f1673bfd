//! Composite health checker

use super::types::{ComponentHealth, HealthCheckResult};
use crate::config::SiblingServicesConfig;
use crate::storage::DatabaseProbe;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Runs the independent component checks side by side
pub struct HealthChecker {
    pub(super) database: Option<Arc<dyn DatabaseProbe>>,
    pub(super) services: SiblingServicesConfig,
    pub(super) memory_threshold_percent: f64,
}

impl std::fmt::Debug for HealthChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthChecker")
            .field("database", &self.database.is_some())
            .field("memory_threshold_percent", &self.memory_threshold_percent)
            .finish()
    }
}

impl HealthChecker {
    pub fn new(
        database: Option<Arc<dyn DatabaseProbe>>,
        services: SiblingServicesConfig,
        memory_threshold_percent: f64,
    ) -> Self {
        Self {
            database,
            services,
            memory_threshold_percent,
        }
    }

    /// Check all components
    ///
    /// A failing component only lowers the overall status; it never aborts the run.
    pub async fn check_all(&self) -> HealthCheckResult {
        debug!("Running composite health check");
        let start_time = Instant::now();

        let (database, ai, auth, integrations, memory) = futures::join!(
            self.check_database(),
            self.check_ai_services(),
            self.check_authentication(),
            self.check_integrations(),
            self.check_memory(),
        );

        let memory_usage = memory.metadata.get("usage_percent").and_then(|v| v.as_f64());
        let components: Vec<ComponentHealth> = vec![database, ai, auth, integrations, memory];

        let result = HealthCheckResult::from_components(
            components,
            start_time.elapsed().as_millis() as u64,
            memory_usage,
        );
        debug!(
            status = %result.status,
            failed = result.failed_checks,
            total = result.total_checks,
            "Health check completed"
        );
        result
    }
}
