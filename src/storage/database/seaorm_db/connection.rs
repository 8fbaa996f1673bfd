use crate::config::DatabaseConfig;
use crate::storage::database::driver::StoreDriver;
use crate::utils::error::{CoreError, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, info};

use super::types::{DatabaseBackendType, SeaOrmDriver};

impl SeaOrmDriver {
    /// Create a new driver
    pub fn new() -> Self {
        Self::default()
    }

    fn connect_options(config: &DatabaseConfig) -> ConnectOptions {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.pool_size)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout())
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .sqlx_logging(config.sqlx_logging)
            .sqlx_logging_level(log::LevelFilter::Debug);
        opt
    }
}

#[async_trait::async_trait]
impl StoreDriver for SeaOrmDriver {
    type Pool = DatabaseConnection;
    type Transaction = DatabaseTransaction;

    fn name(&self) -> &str {
        "sea-orm"
    }

    async fn connect(&self, config: &DatabaseConfig) -> Result<Self::Pool> {
        let backend = DatabaseBackendType::from_url(&config.url);
        debug!(url = %config.redacted_url(), ?backend, "Opening database pool");

        let db = Database::connect(Self::connect_options(config))
            .await
            .map_err(CoreError::Database)?;

        info!("Database connection established ({:?})", backend);
        Ok(db)
    }

    async fn ping(&self, pool: &Self::Pool) -> Result<()> {
        pool.ping().await.map_err(CoreError::Database)
    }

    async fn begin(&self, pool: &Self::Pool) -> Result<Self::Transaction> {
        pool.begin().await.map_err(CoreError::Database)
    }

    async fn commit(&self, tx: Self::Transaction) -> Result<()> {
        tx.commit().await.map_err(CoreError::Database)
    }

    async fn rollback(&self, tx: Self::Transaction) -> Result<()> {
        tx.rollback().await.map_err(CoreError::Database)
    }

    async fn close(&self, pool: Self::Pool) -> Result<()> {
        pool.close().await.map_err(CoreError::Database)
    }
}
