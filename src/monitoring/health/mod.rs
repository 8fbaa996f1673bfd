//! Health checking system
//!
//! Component checks for the store, sibling service configuration and process memory.

mod checker;
mod components;
mod types;

pub use checker::HealthChecker;
pub use types::{ComponentHealth, HealthCheckResult, HealthReport, HealthStatus};
