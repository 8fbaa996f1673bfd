//! Query execution

use super::types::{QueryContext, QueryRecord};
use super::ConnectionManager;
use crate::storage::database::driver::StoreDriver;
use crate::utils::error::{CoreError, ErrorKind, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

impl<D: StoreDriver> ConnectionManager<D> {
    /// Run `op` against the pool under the circuit breaker and the context's retry policy
    ///
    /// `op` is called once per attempt with a handle to the current pool, so a
    /// retry after a reconnect uses the new pool.
    pub async fn execute_query<F, Fut, T>(&self, context: &QueryContext, op: F) -> Result<T>
    where
        F: Fn(D::Pool) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.ensure_available()?;
        let policy = self.inner.retry.policy(&context.policy);
        let start = Instant::now();

        let result = self
            .inner
            .breaker
            .guard(policy.call(&context.operation, || {
                let attempt = self.current_pool().map(&op);
                async move { attempt?.await }
            }))
            .await;

        self.record_outcome(context, start.elapsed(), result.as_ref().err());
        result
    }

    /// Fold the outcome of a managed operation into health, stats, history and metrics
    pub(super) fn record_outcome(
        &self,
        context: &QueryContext,
        elapsed: Duration,
        error: Option<&CoreError>,
    ) {
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        let success = error.is_none();
        let error_kind = error.map(CoreError::kind);

        match error {
            None => {
                self.inner.health.write().record_success(duration_ms);
                debug!(
                    operation = %context.operation,
                    duration_ms,
                    "Database operation succeeded"
                );
            }
            // Rejected without touching the store
            Some(e) if e.is_circuit_open() => {
                debug!(operation = %context.operation, "Database operation rejected: {}", e);
            }
            Some(e) if e.is_transient() => {
                self.inner
                    .health
                    .write()
                    .record_failure(duration_ms, self.inner.resilience.max_consecutive_failures);
                warn!(
                    operation = %context.operation,
                    kind = %e.kind(),
                    duration_ms,
                    "Database operation failed: {}",
                    e
                );
            }
            // The store answered; the connection itself is fine
            Some(e) => {
                self.inner.health.write().error_count += 1;
                warn!(
                    operation = %context.operation,
                    kind = %e.kind(),
                    "Database operation rejected by store: {}",
                    e
                );
            }
        }

        self.inner.stats.lock().record(duration_ms, success);
        self.push_history(QueryRecord {
            operation: context.operation.clone(),
            resource: context.resource.clone(),
            duration_ms,
            success,
            error_kind,
            timestamp: chrono::Utc::now(),
        });
        self.inner.metrics.record_database_metrics(
            &context.operation,
            duration_ms,
            success,
            context.resource.as_deref(),
        );

        if error_kind == Some(ErrorKind::ConnectionError) && !error.is_some_and(CoreError::is_circuit_open) {
            self.spawn_reconnect();
        }
    }
}
