//! In-memory store driver
//!
//! Keeps a key/value table per pool. Writes made inside a transaction are only
//! visible after commit, which lets tests observe rollbacks.

use contentplan_core::config::DatabaseConfig;
use contentplan_core::{CoreError, Result, StoreDriver};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub type Table = Arc<Mutex<BTreeMap<String, String>>>;

#[derive(Debug, Default)]
struct Behavior {
    connect_failures: AtomicU32,
    ping_fails: AtomicBool,
    connects: AtomicU32,
    /// Error messages returned by the next queries, in order
    query_errors: Mutex<VecDeque<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    behavior: Arc<Behavior>,
    table: Table,
}

#[derive(Debug, Clone)]
pub struct MemoryPool {
    table: Table,
    behavior: Arc<Behavior>,
}

#[derive(Debug)]
pub struct MemoryTransaction {
    table: Table,
    pub staged: Mutex<BTreeMap<String, String>>,
}

impl MemoryDriver {
    pub fn fail_next_connects(&self, n: u32) {
        self.behavior.connect_failures.store(n, Ordering::SeqCst);
    }

    pub fn set_ping_fails(&self, fails: bool) {
        self.behavior.ping_fails.store(fails, Ordering::SeqCst);
    }

    /// Queue error messages for the next `MemoryPool::get` calls
    pub fn fail_queries<I, S>(&self, messages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.behavior
            .query_errors
            .lock()
            .extend(messages.into_iter().map(Into::into));
    }

    pub fn connects(&self) -> u32 {
        self.behavior.connects.load(Ordering::SeqCst)
    }

    pub fn table(&self) -> Table {
        Arc::clone(&self.table)
    }
}

impl MemoryPool {
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Some(message) = self.behavior.query_errors.lock().pop_front() {
            return Err(CoreError::store(message));
        }
        Ok(self.table.lock().get(key).cloned())
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        if let Some(message) = self.behavior.query_errors.lock().pop_front() {
            return Err(CoreError::store(message));
        }
        self.table.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl MemoryTransaction {
    pub fn stage(&self, key: &str, value: &str) {
        self.staged.lock().insert(key.to_string(), value.to_string());
    }

    pub fn unstage(&self, key: &str) {
        self.staged.lock().remove(key);
    }
}

#[async_trait::async_trait]
impl StoreDriver for MemoryDriver {
    type Pool = MemoryPool;
    type Transaction = MemoryTransaction;

    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self, _config: &DatabaseConfig) -> Result<Self::Pool> {
        let remaining = self.behavior.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.behavior
                .connect_failures
                .store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::store("connection refused"));
        }
        self.behavior.connects.fetch_add(1, Ordering::SeqCst);
        Ok(MemoryPool {
            table: Arc::clone(&self.table),
            behavior: Arc::clone(&self.behavior),
        })
    }

    async fn ping(&self, _pool: &Self::Pool) -> Result<()> {
        if self.behavior.ping_fails.load(Ordering::SeqCst) {
            return Err(CoreError::store("connection reset by peer"));
        }
        Ok(())
    }

    async fn begin(&self, pool: &Self::Pool) -> Result<Self::Transaction> {
        Ok(MemoryTransaction {
            table: Arc::clone(&pool.table),
            staged: Mutex::new(BTreeMap::new()),
        })
    }

    async fn commit(&self, tx: Self::Transaction) -> Result<()> {
        let staged = std::mem::take(&mut *tx.staged.lock());
        tx.table.lock().extend(staged);
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Transaction) -> Result<()> {
        Ok(())
    }

    async fn close(&self, _pool: Self::Pool) -> Result<()> {
        Ok(())
    }
}
