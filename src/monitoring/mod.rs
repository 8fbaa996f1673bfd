//! Monitoring and observability system
//!
//! This module provides the in-process metrics store, alerting, composite
//! health checks and the dashboard views built on top of them.

// Public submodules
pub mod alerts;
pub mod health;
pub mod metrics;

// Internal submodules
mod background;
mod system;
mod types;

pub use alerts::{Alert, AlertManager, AlertStats, AlertType, NotificationChannel};
pub use health::{ComponentHealth, HealthCheckResult, HealthReport, HealthStatus};
pub use metrics::MetricsStore;
pub use system::{MonitoringService, VERSION};
pub use types::{
    DashboardData, ErrorContext, HealthMetricsRecord, MonitoringStats, SystemError,
    SystemErrorKind,
};
