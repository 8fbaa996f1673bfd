//! Object-safe view of a connection manager for monitoring

use super::types::ConnectionStatus;
use super::ConnectionManager;
use crate::storage::database::driver::StoreDriver;

/// What the monitoring service needs from the database layer
#[async_trait::async_trait]
pub trait DatabaseProbe: Send + Sync {
    /// Round-trip the store
    async fn test_connection(&self) -> bool;

    fn status(&self) -> ConnectionStatus;
}

#[async_trait::async_trait]
impl<D: StoreDriver> DatabaseProbe for ConnectionManager<D> {
    async fn test_connection(&self) -> bool {
        ConnectionManager::test_connection(self).await
    }

    fn status(&self) -> ConnectionStatus {
        self.get_status()
    }
}
