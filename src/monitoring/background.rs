//! Background task implementations for MonitoringService

use super::system::MonitoringService;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};

const MIN_PERIOD: Duration = Duration::from_millis(1);

impl MonitoringService {
    /// Start the periodic health check and retention sweep
    ///
    /// Calling `start` again replaces the running tasks.
    pub fn start(self: &Arc<Self>) {
        self.stop();
        info!(
            health_check_interval_ms = self.config.health_check_interval_ms,
            cleanup_interval_ms = self.config.cleanup_interval_ms,
            "Starting monitoring service"
        );

        let service = Arc::clone(self);
        let health = tokio::spawn(async move {
            let mut ticker = interval(service.config.health_check_interval().max(MIN_PERIOD));
            loop {
                ticker.tick().await;
                let result = service.perform_health_check().await;
                debug!(status = %result.status, "Periodic health check finished");
            }
        });

        let service = Arc::clone(self);
        let cleanup = tokio::spawn(async move {
            let mut ticker = interval(service.config.cleanup_interval().max(MIN_PERIOD));
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                service.cleanup();
            }
        });

        self.tasks.lock().extend([health, cleanup]);
    }

    /// Abort the background tasks
    pub fn stop(&self) {
        let mut tasks = self.tasks.lock();
        if tasks.is_empty() {
            return;
        }
        for task in tasks.drain(..) {
            task.abort();
        }
        info!("Monitoring service stopped");
    }

    pub fn is_running(&self) -> bool {
        self.tasks.lock().iter().any(|task| !task.is_finished())
    }
}
