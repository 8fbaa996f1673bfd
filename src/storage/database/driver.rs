//! Store driver abstraction
//!
//! The connection manager only needs a handful of primitives from the
//! underlying store: open a pool, ping it, and run a transaction. Anything
//! implementing [`StoreDriver`] can sit underneath it.

use crate::config::DatabaseConfig;
use crate::utils::error::Result;

/// Primitives the connection manager requires from a database driver
#[async_trait::async_trait]
pub trait StoreDriver: Send + Sync + 'static {
    /// Pooled connection handle passed to query closures
    type Pool: Clone + Send + Sync + 'static;
    /// Open transaction handle passed to transaction operations
    type Transaction: Send + Sync + 'static;

    /// Driver name used in logs and status output
    fn name(&self) -> &str;

    /// Open a new pool using the given configuration
    async fn connect(&self, config: &DatabaseConfig) -> Result<Self::Pool>;

    /// Trivial round trip used for health checks
    async fn ping(&self, pool: &Self::Pool) -> Result<()>;

    async fn begin(&self, pool: &Self::Pool) -> Result<Self::Transaction>;

    async fn commit(&self, tx: Self::Transaction) -> Result<()>;

    async fn rollback(&self, tx: Self::Transaction) -> Result<()>;

    /// Close a pool, releasing its connections
    async fn close(&self, pool: Self::Pool) -> Result<()>;
}
