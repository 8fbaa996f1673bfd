//! Database storage implementation
//!
//! A [`StoreDriver`] supplies the raw primitives; the [`ConnectionManager`]
//! wraps them with retries, circuit breaking, health tracking and reconnects.
//! [`SeaOrmDriver`] is the production driver.

/// Store driver abstraction
pub mod driver;
/// Resilient connection manager
pub mod manager;
/// SeaORM database implementation module
pub mod seaorm_db;

#[cfg(test)]
pub(crate) mod testing;

pub use driver::StoreDriver;
pub use manager::{
    ConnectionHealth, ConnectionManager, ConnectionState, ConnectionStatus, DatabaseProbe,
    PoolInfo, QueryContext, QueryRecord, QueryStats, TransactionInfo, TransactionOperation,
};
pub use seaorm_db::{DatabaseBackendType, SeaOrmDriver, SeaOrmPool};
