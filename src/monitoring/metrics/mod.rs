//! Metrics collection and aggregation
//!
//! This module provides the in-process metrics store: named numeric series
//! with windowed summaries, domain recorders, and per-domain overviews.

mod aggregation;
mod background;
mod bounded;
mod helpers;
mod recorders;
mod store;
mod system;
mod types;


pub(crate) use bounded::{BoundedPush, Timestamped, prune_before};
pub use recorders::names;
pub use store::MetricsStore;
pub use system::{ProcessMemory, process_memory};
pub use types::{
    AiCallRecord, AiOverview, ApiCallRecord, ApiOverview, BreakdownEntry, DatabaseCallRecord,
    DatabaseOverview, IntegrationCallRecord, IntegrationOverview, MetricPoint, MetricSummary,
    MetricsSummary, OverviewStats,
};
