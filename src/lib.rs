//! # contentplan-core
//!
//! Resilient database access and monitoring core for the content-planning service.
//!
//! ## Features
//!
//! - **Error classification**: every failure is mapped to a kind, a retry verdict and a suggested action
//! - **Named retry policies**: exponential backoff with jitter, retrying only transient failures
//! - **Circuit breaking**: repeated transient failures fail fast until a cooldown elapses
//! - **Connection management**: pool lifecycle, health probes, bounded reconnects, transactions with rollback handlers
//! - **In-process metrics**: time series with windowed summaries and per-domain overviews
//! - **Monitoring**: composite health checks, threshold alerts, notification channels and dashboards
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contentplan_core::{ConnectionManager, CoreConfig, MetricsStore, QueryContext, SeaOrmDriver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = CoreConfig::from_env()?;
//!     let metrics = Arc::new(MetricsStore::new(&config.monitoring));
//!     let db = ConnectionManager::new(
//!         SeaOrmDriver::new(),
//!         config.database.clone(),
//!         config.resilience.clone(),
//!         metrics,
//!     );
//!     db.initialize().await?;
//!
//!     let context = QueryContext::new("list_posts").with_resource("posts");
//!     db.execute_query(&context, |conn| async move { conn.ping().await.map_err(Into::into) })
//!         .await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod monitoring;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::CoreConfig;
pub use monitoring::{
    Alert, AlertType, DashboardData, ErrorContext, HealthReport, HealthStatus, MetricsStore,
    MonitoringService, SystemErrorKind,
};
pub use storage::{
    ConnectionManager, ConnectionState, ConnectionStatus, DatabaseProbe, QueryContext,
    SeaOrmDriver, StoreDriver, TransactionOperation,
};
pub use utils::error::{
    CircuitBreaker, CircuitState, CoreError, ErrorClassification, ErrorClassifier, ErrorKind,
    Result, RetryConfig, RetryPolicies,
};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build information baked in by the build script
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    /// Seconds since the epoch
    pub build_time: &'static str,
    pub git_hash: &'static str,
}

/// Build
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: VERSION,
        build_time: env!("BUILD_TIME"),
        git_hash: env!("GIT_HASH"),
    }
}
