//! Transaction execution with compensating rollback handlers

use super::types::{QueryContext, TransactionInfo};
use super::ConnectionManager;
use crate::storage::database::driver::StoreDriver;
use crate::utils::error::{CoreError, Result};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use tokio::time::Instant;
use tracing::{debug, error, warn};

type ApplyFn<D, T> = Box<
    dyn for<'a> FnOnce(&'a <D as StoreDriver>::Transaction) -> BoxFuture<'a, Result<T>> + Send,
>;

type RollbackFn = Box<dyn FnOnce() -> BoxFuture<'static, Result<()>> + Send>;

/// One step of a managed transaction
///
/// `apply` runs inside the shared driver transaction. The optional rollback
/// handler undoes side effects the driver rollback cannot reach and only runs
/// if this step was applied and a later step failed.
pub struct TransactionOperation<D: StoreDriver, T> {
    label: String,
    apply: ApplyFn<D, T>,
    rollback: Option<RollbackFn>,
}

impl<D: StoreDriver, T> TransactionOperation<D, T> {
    pub fn new<S, F>(label: S, apply: F) -> Self
    where
        S: Into<String>,
        T: Send + 'static,
        F: for<'a> FnOnce(&'a D::Transaction) -> BoxFuture<'a, Result<T>> + Send + 'static,
    {
        Self {
            label: label.into(),
            apply: Box::new(apply),
            rollback: None,
        }
    }

    pub fn with_rollback<F, Fut>(mut self, handler: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.rollback = Some(Box::new(move || handler().boxed()));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<D: StoreDriver, T> std::fmt::Debug for TransactionOperation<D, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionOperation")
            .field("label", &self.label)
            .field("has_rollback", &self.rollback.is_some())
            .finish()
    }
}

impl<D: StoreDriver> ConnectionManager<D> {
    /// Apply `operations` in order inside one driver transaction
    ///
    /// On the first failure, rollback handlers of the steps already applied run
    /// in reverse order, then the driver transaction is rolled back. The caller
    /// always sees the failing step's error; rollback failures are only logged.
    /// Transactions go through the circuit breaker but are never retried.
    /// If the returned future is dropped mid-flight the same rollback runs on a
    /// background task.
    pub async fn execute_transaction<T>(
        &self,
        operations: Vec<TransactionOperation<D, T>>,
        context: &QueryContext,
    ) -> Result<Vec<T>> {
        self.ensure_available()?;
        let start = Instant::now();
        let result = self
            .inner
            .breaker
            .guard(self.run_transaction(operations, context))
            .await;

        self.record_outcome(context, start.elapsed(), result.as_ref().err());
        result
    }

    async fn run_transaction<T>(
        &self,
        operations: Vec<TransactionOperation<D, T>>,
        context: &QueryContext,
    ) -> Result<Vec<T>> {
        let pool = self.current_pool()?;
        let tx = self.inner.driver.begin(&pool).await?;

        let mut guard = TransactionGuard::register(self.clone(), tx, operations.len());
        debug!(
            transaction_id = %guard.id,
            operation = %context.operation,
            steps = operations.len(),
            "Transaction started"
        );

        let mut results = Vec::with_capacity(operations.len());

        for TransactionOperation {
            label,
            apply,
            rollback,
        } in operations
        {
            let outcome = match guard.tx.as_ref() {
                Some(tx) => apply(tx).await,
                None => Err(CoreError::internal("transaction handle already released")),
            };
            match outcome {
                Ok(value) => {
                    results.push(value);
                    guard.record_applied(label, rollback);
                }
                Err(error) => {
                    warn!(
                        transaction_id = %guard.id,
                        step = %label,
                        "Transaction step failed, rolling back: {}",
                        error
                    );
                    guard.roll_back().await;

                    let classification = error.classification();
                    return Err(CoreError::query(label, 1, classification, error));
                }
            }
        }

        guard.commit().await.map(|()| results)
    }
}

/// Tracks one in-flight transaction in the manager's registry
///
/// Every exit path removes the registry entry. A guard dropped while still
/// holding the driver transaction was cancelled, so its compensation is
/// spawned onto the runtime.
struct TransactionGuard<D: StoreDriver> {
    manager: ConnectionManager<D>,
    id: String,
    tx: Option<D::Transaction>,
    applied: Vec<(String, Option<RollbackFn>)>,
}

impl<D: StoreDriver> TransactionGuard<D> {
    fn register(manager: ConnectionManager<D>, tx: D::Transaction, steps: usize) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        manager.inner.active_transactions.insert(
            id.clone(),
            TransactionInfo {
                id: id.clone(),
                started_at: chrono::Utc::now(),
                operations: Vec::with_capacity(steps),
            },
        );
        Self {
            manager,
            id,
            tx: Some(tx),
            applied: Vec::with_capacity(steps),
        }
    }

    fn record_applied(&mut self, label: String, rollback: Option<RollbackFn>) {
        if let Some(mut info) = self.manager.inner.active_transactions.get_mut(&self.id) {
            info.operations.push(label.clone());
        }
        self.applied.push((label, rollback));
    }

    async fn commit(mut self) -> Result<()> {
        let Some(tx) = self.tx.take() else {
            return Err(CoreError::internal("transaction handle already released"));
        };
        let applied = std::mem::take(&mut self.applied);

        match self.manager.inner.driver.commit(tx).await {
            Ok(()) => {
                debug!(transaction_id = %self.id, "Transaction committed");
                Ok(())
            }
            Err(error) => {
                warn!(transaction_id = %self.id, "Transaction commit failed: {}", error);
                run_rollback_handlers(&self.id, applied).await;
                Err(error)
            }
        }
    }

    async fn roll_back(mut self) {
        let tx = self.tx.take();
        let applied = std::mem::take(&mut self.applied);
        compensate(&self.manager, &self.id, tx, applied).await;
    }
}

impl<D: StoreDriver> Drop for TransactionGuard<D> {
    fn drop(&mut self) {
        self.manager.inner.active_transactions.remove(&self.id);

        let Some(tx) = self.tx.take() else {
            return;
        };
        warn!(transaction_id = %self.id, "Transaction cancelled, rolling back in the background");

        let applied = std::mem::take(&mut self.applied);
        let manager = self.manager.clone();
        let id = self.id.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    compensate(&manager, &id, Some(tx), applied).await;
                });
            }
            Err(_) => error!(transaction_id = %id, "No runtime to roll back cancelled transaction"),
        }
    }
}

/// Run the applied steps' handlers, then roll back the driver transaction
async fn compensate<D: StoreDriver>(
    manager: &ConnectionManager<D>,
    id: &str,
    tx: Option<D::Transaction>,
    applied: Vec<(String, Option<RollbackFn>)>,
) {
    run_rollback_handlers(id, applied).await;

    if let Some(tx) = tx {
        if let Err(e) = manager.inner.driver.rollback(tx).await {
            error!(transaction_id = %id, "Driver rollback failed: {}", e);
        }
    }
}

/// Run the handlers of applied steps, newest first
async fn run_rollback_handlers(id: &str, applied: Vec<(String, Option<RollbackFn>)>) {
    for (label, handler) in applied.into_iter().rev() {
        let Some(handler) = handler else {
            continue;
        };
        if let Err(e) = handler().await {
            error!(transaction_id = %id, step = %label, "Rollback handler failed: {}", e);
        }
    }
}
