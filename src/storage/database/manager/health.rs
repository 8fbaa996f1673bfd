//! Health probes and reconnection

use super::types::{ConnectionHealth, ConnectionState};
use super::ConnectionManager;
use crate::storage::database::driver::StoreDriver;
use crate::utils::error::{CoreError, Result};
use std::sync::atomic::Ordering;
use tokio::time::{Instant, interval};
use tracing::{debug, error, info, warn};

impl<D: StoreDriver> ConnectionManager<D> {
    /// Round-trip the store; health is updated whatever the outcome
    pub async fn test_connection(&self) -> bool {
        let start = Instant::now();
        let result = match self.current_pool() {
            Ok(pool) => self.inner.driver.ping(&pool).await,
            Err(e) => Err(e),
        };
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(()) => {
                self.inner.health.write().record_success(elapsed_ms);
                debug!(response_time_ms = elapsed_ms, "Database health check passed");
                true
            }
            Err(e) => {
                self.inner
                    .health
                    .write()
                    .record_failure(elapsed_ms, self.inner.resilience.max_consecutive_failures);
                warn!("Database health check failed: {}", e);
                false
            }
        }
    }

    /// Recreate the pool, backing off between failed attempts
    ///
    /// Gives up once the reconnect budget is spent and leaves the manager
    /// `Unavailable` until [`refresh_pool`](Self::refresh_pool) is called.
    /// Returns immediately if another reconnect is already running.
    pub async fn reconnect(&self) -> Result<()> {
        if self.inner.reconnecting.swap(true, Ordering::SeqCst) {
            debug!("Reconnect already in progress");
            return Ok(());
        }

        let result = self.reconnect_with_backoff().await;
        self.inner.reconnecting.store(false, Ordering::SeqCst);
        result
    }

    async fn reconnect_with_backoff(&self) -> Result<()> {
        let max_attempts = self.inner.resilience.max_reconnect_attempts;

        loop {
            if self.state() == ConnectionState::Closed {
                return Err(CoreError::unavailable("connection manager is shut down"));
            }

            let attempt = self.inner.reconnect_attempts.load(Ordering::SeqCst) + 1;
            if attempt > max_attempts {
                return Err(self.give_up_reconnecting(max_attempts).await);
            }
            self.inner.reconnect_attempts.store(attempt, Ordering::SeqCst);
            self.set_state(ConnectionState::Reconnecting);
            info!(attempt, max_attempts, "Reconnecting to database");

            let outcome = match self.open_pool().await {
                Ok(()) => Ok(self.test_connection().await),
                Err(e) => Err(e),
            };

            match outcome {
                Ok(true) => {
                    self.inner.reconnect_attempts.store(0, Ordering::SeqCst);
                    self.set_state(ConnectionState::Connected);
                    info!("Database reconnected on attempt {}", attempt);
                    return Ok(());
                }
                Ok(false) => warn!(
                    "Reconnect attempt {} opened a pool that failed its health check",
                    attempt
                ),
                Err(e) => warn!("Reconnect attempt {} failed: {}", attempt, e),
            }

            if attempt >= max_attempts {
                return Err(self.give_up_reconnecting(max_attempts).await);
            }

            let delay = self.inner.resilience.reconnect_delay(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "Waiting before next reconnect attempt");
            tokio::time::sleep(delay).await;
        }
    }

    /// Mark the store unavailable and close the stale pool so managed calls fail fast
    async fn give_up_reconnecting(&self, max_attempts: u32) -> CoreError {
        self.set_state(ConnectionState::Unavailable);
        error!(
            "Database unavailable after {} reconnect attempts, manual refresh required",
            max_attempts
        );

        let stale = self.inner.pool.write().take();
        if let Some(pool) = stale {
            if let Err(e) = self.inner.driver.close(pool).await {
                warn!("Failed to close stale database pool: {}", e);
            }
        }

        CoreError::unavailable(format!(
            "database unreachable after {} reconnect attempts",
            max_attempts
        ))
    }

    /// Reconnect in the background unless one is already running
    pub(super) fn spawn_reconnect(&self) {
        if self.inner.reconnecting.load(Ordering::SeqCst)
            || matches!(self.state(), ConnectionState::Closed | ConnectionState::Unavailable)
        {
            return;
        }

        let manager = self.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = manager.reconnect().await {
                error!("Background reconnect failed: {}", e);
            }
        });
        self.track_task(handle);
    }

    /// Probe the store on a fixed interval, reconnecting when it is unhealthy
    pub fn start_health_monitoring(&self) {
        let manager = self.clone();
        let period = self
            .inner
            .resilience
            .health_check_interval()
            .max(std::time::Duration::from_millis(1));
        info!(interval_ms = period.as_millis() as u64, "Starting database health monitoring");

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                match manager.state() {
                    ConnectionState::Closed => break,
                    ConnectionState::Unavailable | ConnectionState::Reconnecting => continue,
                    ConnectionState::Connecting | ConnectionState::Connected => {}
                }

                if !manager.test_connection().await && !manager.health().is_healthy {
                    if let Err(e) = manager.reconnect().await {
                        error!("Reconnect after failed health check did not succeed: {}", e);
                    }
                }
            }
        });
        self.track_task(handle);
    }

    /// Operator recovery: reset the breaker, health counters and reconnect budget, then reconnect
    pub async fn refresh_pool(&self) -> Result<()> {
        info!("Refreshing database pool");
        self.inner.breaker.reset();
        *self.inner.health.write() = ConnectionHealth::default();
        self.inner.reconnect_attempts.store(0, Ordering::SeqCst);

        if self.state() == ConnectionState::Unavailable {
            self.set_state(ConnectionState::Connecting);
        }

        self.reconnect().await
    }
}
