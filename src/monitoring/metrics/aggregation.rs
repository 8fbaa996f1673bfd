//! Per-domain overviews over the raw record logs

use super::helpers::{calculate_average, calculate_percentile, sorted_finite};
use super::store::{MetricsStore, window_start};
use super::types::{
    AiOverview, ApiOverview, BreakdownEntry, CallRecord, DatabaseOverview, IntegrationOverview,
    OverviewStats,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

/// Overall stats plus a breakdown by each record's group key
fn aggregate<'a, R, I>(records: I) -> (OverviewStats, BTreeMap<String, BreakdownEntry>)
where
    R: CallRecord + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut latencies = Vec::new();
    let mut errors = 0usize;
    let mut groups: BTreeMap<String, (Vec<f64>, usize)> = BTreeMap::new();

    for record in records {
        let latency = record.latency_ms();
        latencies.push(latency);
        let group = groups.entry(record.group_key().to_string()).or_default();
        group.0.push(latency);
        if record.is_error() {
            errors += 1;
            group.1 += 1;
        }
    }

    let total = latencies.len();
    if total == 0 {
        return (OverviewStats::default(), BTreeMap::new());
    }

    let sorted = sorted_finite(latencies);
    let error_rate = errors as f64 / total as f64;
    let stats = OverviewStats {
        total,
        avg_response_time: calculate_average(&sorted),
        p95_response_time: calculate_percentile(&sorted, 0.95),
        success_rate: 1.0 - error_rate,
        error_rate,
    };

    let breakdown = groups
        .into_iter()
        .map(|(key, (values, errors))| {
            let count = values.len();
            let entry = BreakdownEntry {
                count,
                avg_response_time: calculate_average(&values),
                error_rate: errors as f64 / count as f64,
            };
            (key, entry)
        })
        .collect();

    (stats, breakdown)
}

fn in_window<R: CallRecord>(
    records: &VecDeque<R>,
    since: DateTime<Utc>,
) -> impl Iterator<Item = &R> {
    records.iter().filter(move |r| r.timestamp() >= since)
}

impl MetricsStore {
    /// API requests over the last `window`, broken down by endpoint
    pub fn api_overview(&self, window: Duration) -> ApiOverview {
        let since = window_start(Utc::now(), window);
        let storage = self.storage.read();
        let (stats, by_endpoint) = aggregate(in_window(&storage.api_calls, since));
        ApiOverview { stats, by_endpoint }
    }

    /// Database operations over the last `window`, broken down by operation
    pub fn database_overview(&self, window: Duration) -> DatabaseOverview {
        let since = window_start(Utc::now(), window);
        let storage = self.storage.read();
        let (stats, by_operation) = aggregate(in_window(&storage.database_calls, since));
        DatabaseOverview {
            stats,
            by_operation,
        }
    }

    /// AI service calls over the last `window`, broken down by service
    pub fn ai_overview(&self, window: Duration) -> AiOverview {
        let since = window_start(Utc::now(), window);
        let storage = self.storage.read();
        let (stats, by_service) = aggregate(in_window(&storage.ai_calls, since));
        let (total_tokens, total_cost) = in_window(&storage.ai_calls, since)
            .fold((0u64, 0.0f64), |(tokens, cost), r| {
                (tokens.saturating_add(r.tokens_used), cost + r.cost)
            });

        AiOverview {
            stats,
            total_tokens,
            total_cost,
            by_service,
        }
    }

    /// Integration calls over the last `window`, broken down by platform
    pub fn integration_overview(&self, window: Duration) -> IntegrationOverview {
        let since = window_start(Utc::now(), window);
        let storage = self.storage.read();
        let (stats, by_platform) = aggregate(in_window(&storage.integration_calls, since));
        IntegrationOverview { stats, by_platform }
    }
}
