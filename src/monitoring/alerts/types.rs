//! Alert types and storage

use crate::monitoring::metrics::Timestamped;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;

/// Alert type, in increasing order of urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Info,
    Warning,
    Error,
    Critical,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Info => "info",
            AlertType::Warning => "warning",
            AlertType::Error => "error",
            AlertType::Critical => "critical",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
    /// Set exactly when `resolved` is true
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    /// Condition key used to deduplicate threshold alerts while unresolved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Alert {
    pub fn new<T: Into<String>, M: Into<String>>(alert_type: AlertType, title: T, message: M) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            alert_type,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            resolved: false,
            resolved_at: None,
            metadata: HashMap::new(),
            fingerprint: None,
        }
    }

    pub fn with_metadata<K: Into<String>>(mut self, key: K, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_fingerprint<S: Into<String>>(mut self, fingerprint: S) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Mark resolved; false when it already was
    pub(super) fn resolve(&mut self, at: DateTime<Utc>) -> bool {
        if self.resolved {
            return false;
        }
        self.resolved = true;
        self.resolved_at = Some(at);
        true
    }
}

impl Timestamped for Alert {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Alert statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertStats {
    /// Total alerts raised since startup
    pub total_alerts: u64,
    pub alerts_by_type: BTreeMap<String, u64>,
    pub resolved_alerts: u64,
    /// Raises suppressed because the same condition was already alerting
    pub deduplicated_alerts: u64,
    pub failed_notifications: u64,
    pub last_alert: Option<DateTime<Utc>>,
}

/// Consolidated alert storage - single lock for history and stats
#[derive(Debug, Default)]
pub(super) struct AlertStorage {
    pub(super) alerts: VecDeque<Alert>,
    pub(super) stats: AlertStats,
}
