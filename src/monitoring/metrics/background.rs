//! Background tasks for metrics maintenance

use super::store::MetricsStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

impl MetricsStore {
    /// Sweep expired entries every `period` until the handle is aborted
    pub fn start_cleanup(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        debug!(interval_ms = period.as_millis() as u64, "Starting metrics cleanup task");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
            // First tick completes immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}
