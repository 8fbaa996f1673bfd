//! Types for metrics storage and summaries

use super::bounded::Timestamped;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// A single observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub tags: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Timestamped for MetricPoint {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Summary of one series over a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub count: usize,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub unit: Option<String>,
}

/// Summaries of every series over a window
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSummary {
    /// Number of series held by the store
    pub total_metrics: usize,
    pub window_ms: u64,
    pub metrics: BTreeMap<String, MetricSummary>,
}

/// An API request observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallRecord {
    pub endpoint: String,
    pub method: String,
    pub response_time_ms: f64,
    pub status_code: u16,
    pub timestamp: DateTime<Utc>,
}

/// A database operation observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseCallRecord {
    pub operation: String,
    pub table: Option<String>,
    pub duration_ms: f64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// An AI service call observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiCallRecord {
    pub service: String,
    pub model: Option<String>,
    pub response_time_ms: f64,
    pub tokens_used: u64,
    /// Cost in USD
    pub cost: f64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// A third-party integration call observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationCallRecord {
    pub platform: String,
    pub operation: String,
    pub response_time_ms: f64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

/// Common view over the per-domain call records
pub(crate) trait CallRecord: Timestamped {
    /// Breakdown dimension (endpoint, operation, service, platform)
    fn group_key(&self) -> &str;
    fn latency_ms(&self) -> f64;
    fn is_error(&self) -> bool;
}

impl Timestamped for ApiCallRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CallRecord for ApiCallRecord {
    fn group_key(&self) -> &str {
        &self.endpoint
    }

    fn latency_ms(&self) -> f64 {
        self.response_time_ms
    }

    fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

impl Timestamped for DatabaseCallRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CallRecord for DatabaseCallRecord {
    fn group_key(&self) -> &str {
        &self.operation
    }

    fn latency_ms(&self) -> f64 {
        self.duration_ms
    }

    fn is_error(&self) -> bool {
        !self.success
    }
}

impl Timestamped for AiCallRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CallRecord for AiCallRecord {
    fn group_key(&self) -> &str {
        &self.service
    }

    fn latency_ms(&self) -> f64 {
        self.response_time_ms
    }

    fn is_error(&self) -> bool {
        !self.success
    }
}

impl Timestamped for IntegrationCallRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl CallRecord for IntegrationCallRecord {
    fn group_key(&self) -> &str {
        &self.platform
    }

    fn latency_ms(&self) -> f64 {
        self.response_time_ms
    }

    fn is_error(&self) -> bool {
        !self.success
    }
}

/// Consolidated metrics storage - single lock for all metrics
#[derive(Debug, Default)]
pub(super) struct MetricsStorage {
    pub(super) series: HashMap<String, VecDeque<MetricPoint>>,
    pub(super) api_calls: VecDeque<ApiCallRecord>,
    pub(super) database_calls: VecDeque<DatabaseCallRecord>,
    pub(super) ai_calls: VecDeque<AiCallRecord>,
    pub(super) integration_calls: VecDeque<IntegrationCallRecord>,
}

/// Aggregate figures shared by every domain overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewStats {
    pub total: usize,
    pub avg_response_time: f64,
    pub p95_response_time: f64,
    /// Fraction of calls that succeeded (1.0 when there were none)
    pub success_rate: f64,
    pub error_rate: f64,
}

impl Default for OverviewStats {
    fn default() -> Self {
        Self {
            total: 0,
            avg_response_time: 0.0,
            p95_response_time: 0.0,
            success_rate: 1.0,
            error_rate: 0.0,
        }
    }
}

/// Per-dimension figures in an overview breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub count: usize,
    pub avg_response_time: f64,
    pub error_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiOverview {
    #[serde(flatten)]
    pub stats: OverviewStats,
    pub by_endpoint: BTreeMap<String, BreakdownEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseOverview {
    #[serde(flatten)]
    pub stats: OverviewStats,
    pub by_operation: BTreeMap<String, BreakdownEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiOverview {
    #[serde(flatten)]
    pub stats: OverviewStats,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub by_service: BTreeMap<String, BreakdownEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntegrationOverview {
    #[serde(flatten)]
    pub stats: OverviewStats,
    pub by_platform: BTreeMap<String, BreakdownEntry>,
}
