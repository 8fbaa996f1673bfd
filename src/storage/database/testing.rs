//! Scripted in-memory driver for unit tests

use super::driver::StoreDriver;
use crate::config::DatabaseConfig;
use crate::utils::error::{CoreError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[derive(Debug)]
pub(crate) struct Script {
    pub connect_failures: AtomicU32,
    pub ping_ok: AtomicBool,
    pub fail_commit: AtomicBool,
    pub fail_rollback: AtomicBool,
    pub connects: AtomicU32,
    pub pings: AtomicU32,
    pub begins: AtomicU32,
    pub commits: AtomicU32,
    pub rollbacks: AtomicU32,
    pub closes: AtomicU32,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            connect_failures: AtomicU32::new(0),
            ping_ok: AtomicBool::new(true),
            fail_commit: AtomicBool::new(false),
            fail_rollback: AtomicBool::new(false),
            connects: AtomicU32::new(0),
            pings: AtomicU32::new(0),
            begins: AtomicU32::new(0),
            commits: AtomicU32::new(0),
            rollbacks: AtomicU32::new(0),
            closes: AtomicU32::new(0),
        }
    }
}

/// Driver whose behavior is set through a shared [`Script`]
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedDriver {
    pub script: Arc<Script>,
}

/// Pool handle; the generation increments on every successful connect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ScriptedPool(pub u32);

#[derive(Debug)]
pub(crate) struct ScriptedTransaction;

impl ScriptedDriver {
    pub fn fail_next_connects(&self, n: u32) {
        self.script.connect_failures.store(n, Ordering::SeqCst);
    }

    pub fn set_ping_ok(&self, ok: bool) {
        self.script.ping_ok.store(ok, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicU32) -> u32 {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StoreDriver for ScriptedDriver {
    type Pool = ScriptedPool;
    type Transaction = ScriptedTransaction;

    fn name(&self) -> &str {
        "scripted"
    }

    async fn connect(&self, _config: &DatabaseConfig) -> Result<Self::Pool> {
        let remaining = self.script.connect_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.script.connect_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CoreError::store("connection refused"));
        }
        let generation = self.script.connects.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ScriptedPool(generation))
    }

    async fn ping(&self, _pool: &Self::Pool) -> Result<()> {
        self.script.pings.fetch_add(1, Ordering::SeqCst);
        if self.script.ping_ok.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::store("connection reset by peer"))
        }
    }

    async fn begin(&self, _pool: &Self::Pool) -> Result<Self::Transaction> {
        self.script.begins.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedTransaction)
    }

    async fn commit(&self, _tx: Self::Transaction) -> Result<()> {
        if self.script.fail_commit.load(Ordering::SeqCst) {
            return Err(CoreError::store("could not serialize access: deadlock detected"));
        }
        self.script.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&self, _tx: Self::Transaction) -> Result<()> {
        self.script.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_rollback.load(Ordering::SeqCst) {
            return Err(CoreError::store("rollback failed: server closed the connection"));
        }
        Ok(())
    }

    async fn close(&self, _pool: Self::Pool) -> Result<()> {
        self.script.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
