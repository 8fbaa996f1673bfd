//! Resilient connection manager
//!
//! Owns the pooled connection to the store and routes every operation through
//! the circuit breaker and a named retry policy. Outcomes feed the connection
//! health, the lifetime query stats, a bounded query history and the metrics
//! store. Connection-type failures trigger a background reconnect.

mod health;
mod probe;
mod query;
mod transaction;
mod types;

pub use probe::DatabaseProbe;
pub use transaction::TransactionOperation;
pub use types::{
    ConnectionHealth, ConnectionState, ConnectionStatus, PoolInfo, QueryContext, QueryRecord,
    QueryStats, TransactionInfo,
};

use crate::config::{DatabaseConfig, ResilienceConfig};
use crate::monitoring::metrics::MetricsStore;
use crate::storage::database::driver::StoreDriver;
use crate::utils::error::recovery::{CircuitBreaker, RetryPolicies};
use crate::utils::error::{CoreError, Result};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Maximum age of query history entries
const QUERY_HISTORY_MAX_AGE_SECS: i64 = 60 * 60;

struct Inner<D: StoreDriver> {
    driver: D,
    config: DatabaseConfig,
    resilience: ResilienceConfig,
    pool: RwLock<Option<D::Pool>>,
    state: RwLock<ConnectionState>,
    health: RwLock<ConnectionHealth>,
    breaker: CircuitBreaker,
    retry: RetryPolicies,
    metrics: Arc<MetricsStore>,
    reconnect_attempts: AtomicU32,
    reconnecting: AtomicBool,
    active_transactions: DashMap<String, TransactionInfo>,
    history: Mutex<VecDeque<QueryRecord>>,
    stats: Mutex<QueryStats>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

/// Resilient connection manager for a single store
pub struct ConnectionManager<D: StoreDriver> {
    inner: Arc<Inner<D>>,
}

impl<D: StoreDriver> Clone for ConnectionManager<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: StoreDriver> std::fmt::Debug for ConnectionManager<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("driver", &self.inner.driver.name())
            .field("state", &*self.inner.state.read())
            .finish()
    }
}

impl<D: StoreDriver> ConnectionManager<D> {
    /// Create a manager; no connection is opened until [`initialize`](Self::initialize)
    pub fn new(
        driver: D,
        config: DatabaseConfig,
        resilience: ResilienceConfig,
        metrics: Arc<MetricsStore>,
    ) -> Self {
        let breaker = CircuitBreaker::new("database", resilience.circuit_breaker())
            .with_failure_predicate(|error| error.is_transient());
        let retry = RetryPolicies::new(&resilience.retry_policies);
        let history_capacity = resilience.query_history_size;

        Self {
            inner: Arc::new(Inner {
                driver,
                config,
                resilience,
                pool: RwLock::new(None),
                state: RwLock::new(ConnectionState::Connecting),
                health: RwLock::new(ConnectionHealth::default()),
                breaker,
                retry,
                metrics,
                reconnect_attempts: AtomicU32::new(0),
                reconnecting: AtomicBool::new(false),
                active_transactions: DashMap::new(),
                history: Mutex::new(VecDeque::with_capacity(history_capacity.min(1024))),
                stats: Mutex::new(QueryStats::default()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Open the pool and verify it with a round trip
    pub async fn initialize(&self) -> Result<()> {
        info!(
            driver = self.inner.driver.name(),
            url = %self.inner.config.redacted_url(),
            "Initializing database connection"
        );
        self.set_state(ConnectionState::Connecting);

        if let Err(e) = self.open_pool().await {
            warn!("Initial database connection failed: {}", e);
            self.inner
                .health
                .write()
                .record_failure(0.0, self.inner.resilience.max_consecutive_failures);
            return Err(e);
        }

        if self.test_connection().await {
            self.set_state(ConnectionState::Connected);
            info!("Database connection initialized");
            Ok(())
        } else {
            Err(CoreError::unavailable("database did not answer the initial health check"))
        }
    }

    /// Reject managed calls outright while the store is given up on or shut down
    fn ensure_available(&self) -> Result<()> {
        match self.state() {
            ConnectionState::Unavailable => Err(CoreError::unavailable(
                "database unavailable, manual pool refresh required",
            )),
            ConnectionState::Closed => Err(CoreError::unavailable("connection manager is shut down")),
            _ => Ok(()),
        }
    }

    /// Current pool, or an availability error when none is open
    fn current_pool(&self) -> Result<D::Pool> {
        self.inner
            .pool
            .read()
            .clone()
            .ok_or_else(|| CoreError::unavailable("database pool is not connected"))
    }

    /// Connect a fresh pool, swap it in, and close the previous one
    async fn open_pool(&self) -> Result<()> {
        let pool = self.inner.driver.connect(&self.inner.config).await?;
        let previous = self.inner.pool.write().replace(pool);

        if let Some(previous) = previous {
            if let Err(e) = self.inner.driver.close(previous).await {
                warn!("Failed to close previous database pool: {}", e);
            }
        }
        Ok(())
    }

    pub fn state(&self) -> ConnectionState {
        *self.inner.state.read()
    }

    fn set_state(&self, state: ConnectionState) {
        let mut current = self.inner.state.write();
        if *current != state {
            debug!(from = %*current, to = %state, "Connection state change");
            *current = state;
        }
    }

    pub fn health(&self) -> ConnectionHealth {
        self.inner.health.read().clone()
    }

    /// Full status snapshot
    pub fn get_status(&self) -> ConnectionStatus {
        let config = &self.inner.config;
        ConnectionStatus {
            state: self.state(),
            health: self.health(),
            circuit_breaker: self.inner.breaker.snapshot(),
            reconnect_attempts: self.inner.reconnect_attempts.load(Ordering::SeqCst),
            active_transactions: self.inner.active_transactions.len(),
            query_stats: self.inner.stats.lock().clone(),
            pool: PoolInfo {
                driver: self.inner.driver.name().to_string(),
                size: config.pool_size,
                min_connections: config.min_connections,
                connect_timeout_ms: config.connect_timeout_ms,
                idle_timeout_ms: config.idle_timeout_ms,
            },
        }
    }

    /// Most recent managed operations, newest first
    pub fn get_query_history(&self, limit: usize) -> Vec<QueryRecord> {
        self.inner.history.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Transactions currently in flight
    pub fn active_transactions(&self) -> Vec<TransactionInfo> {
        let mut transactions: Vec<TransactionInfo> = self
            .inner
            .active_transactions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        transactions.sort_by_key(|t| t.started_at);
        transactions
    }

    /// Force the circuit breaker closed
    pub fn reset_circuit_breaker(&self) {
        self.inner.breaker.reset();
    }

    /// Retry policy registry, for callers outside the database path
    pub fn retry_policies(&self) -> &RetryPolicies {
        &self.inner.retry
    }

    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.inner.metrics
    }

    fn push_history(&self, record: QueryRecord) {
        let capacity = self.inner.resilience.query_history_size.max(1);
        let cutoff = record.timestamp - chrono::Duration::seconds(QUERY_HISTORY_MAX_AGE_SECS);

        let mut history = self.inner.history.lock();
        while history.front().is_some_and(|r| r.timestamp < cutoff) {
            history.pop_front();
        }
        while history.len() >= capacity {
            history.pop_front();
        }
        history.push_back(record);
    }

    fn track_task(&self, handle: JoinHandle<()>) {
        let mut tasks = self.inner.tasks.lock();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Stop background tasks and close the pool
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down database connection manager");
        self.set_state(ConnectionState::Closed);

        for task in self.inner.tasks.lock().drain(..) {
            task.abort();
        }

        let in_flight = self.inner.active_transactions.len();
        if in_flight > 0 {
            warn!("Closing database pool with {} transaction(s) in flight", in_flight);
        }

        let pool = self.inner.pool.write().take();
        if let Some(pool) = pool {
            self.inner.driver.close(pool).await?;
        }

        info!("Database connection manager shut down");
        Ok(())
    }
}
