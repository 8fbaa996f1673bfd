//! In-process metrics store

use super::bounded::{BoundedPush, prune_before};
use super::helpers::summarize;
use super::types::{MetricPoint, MetricsStorage, MetricsSummary};
use crate::config::MonitoringConfig;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;
use tracing::{debug, trace};

/// Time- and count-bounded store of named numeric series
///
/// Every write prunes its own series (and record log) by age and size, so
/// memory stays bounded without relying on the periodic sweep.
#[derive(Debug)]
pub struct MetricsStore {
    pub(super) storage: RwLock<MetricsStorage>,
    pub(super) retention: chrono::Duration,
    pub(super) max_points_per_series: usize,
    pub(super) max_records: usize,
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(&MonitoringConfig::default())
    }
}

impl MetricsStore {
    /// Create a store sized from the monitoring configuration
    pub fn new(config: &MonitoringConfig) -> Self {
        Self::with_limits(
            config.metrics_retention(),
            config.max_points_per_series,
            config.max_records,
        )
    }

    pub fn with_limits(retention: Duration, max_points_per_series: usize, max_records: usize) -> Self {
        Self {
            storage: RwLock::new(MetricsStorage::default()),
            retention: to_chrono(retention),
            max_points_per_series: max_points_per_series.max(1),
            max_records: max_records.max(1),
        }
    }

    pub fn retention(&self) -> chrono::Duration {
        self.retention
    }

    pub(super) fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Record an observation now
    pub fn record_metric(
        &self,
        name: &str,
        value: f64,
        tags: Option<HashMap<String, String>>,
        unit: Option<&str>,
    ) {
        self.record_metric_at(name, value, tags, unit, Utc::now());
    }

    /// Record an observation with an explicit timestamp
    ///
    /// Future timestamps are clamped to now. Timestamps older than the newest
    /// point in the series are moved up to it so each series stays ordered.
    pub fn record_metric_at(
        &self,
        name: &str,
        value: f64,
        tags: Option<HashMap<String, String>>,
        unit: Option<&str>,
        timestamp: DateTime<Utc>,
    ) {
        if name.is_empty() || !value.is_finite() {
            debug!(metric = name, value, "Ignoring invalid metric observation");
            return;
        }

        let now = Utc::now();
        let cutoff = self.cutoff(now);
        let timestamp = timestamp.min(now);
        let mut storage = self.storage.write();
        let series = storage.series.entry(name.to_string()).or_default();

        let timestamp = match series.back() {
            Some(last) if last.timestamp > timestamp => last.timestamp,
            _ => timestamp,
        };

        series.push_bounded(
            MetricPoint {
                timestamp,
                value,
                tags: tags.unwrap_or_default(),
                unit: unit.map(String::from),
            },
            self.max_points_per_series,
        );
        prune_before(series, cutoff);
        trace!(metric = name, value, "Recorded metric");
    }

    /// Summaries of every series over the last `window`
    pub fn get_metrics_summary(&self, window: Duration) -> MetricsSummary {
        let now = Utc::now();
        let since = window_start(now, window);
        let storage = self.storage.read();

        let metrics: BTreeMap<String, _> = storage
            .series
            .iter()
            .map(|(name, points)| {
                let in_window: Vec<&MetricPoint> = points
                    .iter()
                    .filter(|p| p.timestamp >= since && p.timestamp <= now)
                    .collect();
                let unit = in_window
                    .last()
                    .and_then(|p| p.unit.clone())
                    .or_else(|| points.back().and_then(|p| p.unit.clone()));
                let values = in_window.iter().map(|p| p.value).collect();
                (name.clone(), summarize(values, unit))
            })
            .collect();

        MetricsSummary {
            total_metrics: storage.series.len(),
            window_ms: window.as_millis() as u64,
            metrics,
        }
    }

    /// Points of one series within the last `window`, oldest first
    pub fn get_series(&self, name: &str, window: Duration) -> Vec<MetricPoint> {
        let now = Utc::now();
        let since = window_start(now, window);
        self.storage
            .read()
            .series
            .get(name)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.timestamp >= since && p.timestamp <= now)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of series currently held
    pub fn series_count(&self) -> usize {
        self.storage.read().series.len()
    }

    /// Sweep expired points and records; drops series left empty
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let cutoff = self.cutoff(Utc::now());
        let mut storage = self.storage.write();
        let mut removed = 0;

        for points in storage.series.values_mut() {
            removed += prune_before(points, cutoff);
        }
        storage.series.retain(|_, points| !points.is_empty());

        removed += prune_before(&mut storage.api_calls, cutoff);
        removed += prune_before(&mut storage.database_calls, cutoff);
        removed += prune_before(&mut storage.ai_calls, cutoff);
        removed += prune_before(&mut storage.integration_calls, cutoff);

        if removed > 0 {
            debug!("Metrics cleanup removed {} expired entries", removed);
        }
        removed
    }

    /// Append a domain record, pruning its log by age and size
    pub(super) fn push_record<T: super::bounded::Timestamped>(
        &self,
        select: impl FnOnce(&mut MetricsStorage) -> &mut VecDeque<T>,
        record: T,
    ) {
        let cutoff = self.cutoff(Utc::now());
        let mut storage = self.storage.write();
        let records = select(&mut storage);
        records.push_bounded(record, self.max_records);
        prune_before(records, cutoff);
    }
}

pub(super) fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(to_chrono(window))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
