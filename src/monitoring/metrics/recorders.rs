//! Domain-specific recorders
//!
//! Each recorder writes standardized series and keeps a raw record log used
//! for the per-endpoint, per-operation, per-service and per-platform breakdowns.

use super::store::MetricsStore;
use super::types::{AiCallRecord, ApiCallRecord, DatabaseCallRecord, IntegrationCallRecord};
use chrono::Utc;
use std::collections::HashMap;

/// Series names written by the domain recorders
pub mod names {
    pub const API_RESPONSE_TIME: &str = "api_response_time";
    pub const API_ERRORS: &str = "api_errors";
    pub const DATABASE_QUERY_TIME: &str = "database_query_time";
    pub const DATABASE_ERRORS: &str = "database_errors";
    pub const AI_RESPONSE_TIME: &str = "ai_response_time";
    pub const AI_TOKENS_USED: &str = "ai_tokens_used";
    pub const AI_COST: &str = "ai_cost";
    pub const INTEGRATION_RESPONSE_TIME: &str = "integration_response_time";
    pub const INTEGRATION_ERRORS: &str = "integration_errors";
    pub const HEALTH_RESPONSE_TIME: &str = "health_check_response_time";
    pub const MEMORY_USAGE: &str = "memory_usage_percent";
}

fn tags<const N: usize>(pairs: [(&str, &str); N]) -> Option<HashMap<String, String>> {
    Some(
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    )
}

impl MetricsStore {
    /// Record an API request
    pub fn record_api_response_time(
        &self,
        endpoint: &str,
        method: &str,
        response_time_ms: f64,
        status_code: u16,
    ) {
        let status = status_code.to_string();
        self.record_metric(
            names::API_RESPONSE_TIME,
            response_time_ms,
            tags([("endpoint", endpoint), ("method", method), ("status", status.as_str())]),
            Some("ms"),
        );
        if status_code >= 400 {
            self.record_metric(
                names::API_ERRORS,
                1.0,
                tags([("endpoint", endpoint), ("status", status.as_str())]),
                Some("count"),
            );
        }

        self.push_record(
            |s| &mut s.api_calls,
            ApiCallRecord {
                endpoint: endpoint.to_string(),
                method: method.to_string(),
                response_time_ms,
                status_code,
                timestamp: Utc::now(),
            },
        );
    }

    /// Record a database operation
    pub fn record_database_metrics(
        &self,
        operation: &str,
        duration_ms: f64,
        success: bool,
        table: Option<&str>,
    ) {
        let success_tag = if success { "true" } else { "false" };
        self.record_metric(
            names::DATABASE_QUERY_TIME,
            duration_ms,
            tags([
                ("operation", operation),
                ("table", table.unwrap_or("unknown")),
                ("success", success_tag),
            ]),
            Some("ms"),
        );
        if !success {
            self.record_metric(
                names::DATABASE_ERRORS,
                1.0,
                tags([("operation", operation)]),
                Some("count"),
            );
        }

        self.push_record(
            |s| &mut s.database_calls,
            DatabaseCallRecord {
                operation: operation.to_string(),
                table: table.map(String::from),
                duration_ms,
                success,
                timestamp: Utc::now(),
            },
        );
    }

    /// Record an AI service call with its token usage and cost
    pub fn record_ai_service_metrics(
        &self,
        service: &str,
        model: Option<&str>,
        response_time_ms: f64,
        tokens_used: u64,
        cost: f64,
        success: bool,
    ) {
        let model_tag = model.unwrap_or("unknown");
        self.record_metric(
            names::AI_RESPONSE_TIME,
            response_time_ms,
            tags([("service", service), ("model", model_tag)]),
            Some("ms"),
        );
        self.record_metric(
            names::AI_TOKENS_USED,
            tokens_used as f64,
            tags([("service", service), ("model", model_tag)]),
            Some("tokens"),
        );
        self.record_metric(
            names::AI_COST,
            cost,
            tags([("service", service)]),
            Some("usd"),
        );

        self.push_record(
            |s| &mut s.ai_calls,
            AiCallRecord {
                service: service.to_string(),
                model: model.map(String::from),
                response_time_ms,
                tokens_used,
                cost,
                success,
                timestamp: Utc::now(),
            },
        );
    }

    /// Record a third-party integration call
    pub fn record_integration_metrics(
        &self,
        platform: &str,
        operation: &str,
        response_time_ms: f64,
        success: bool,
    ) {
        self.record_metric(
            names::INTEGRATION_RESPONSE_TIME,
            response_time_ms,
            tags([("platform", platform), ("operation", operation)]),
            Some("ms"),
        );
        if !success {
            self.record_metric(
                names::INTEGRATION_ERRORS,
                1.0,
                tags([("platform", platform), ("operation", operation)]),
                Some("count"),
            );
        }

        self.push_record(
            |s| &mut s.integration_calls,
            IntegrationCallRecord {
                platform: platform.to_string(),
                operation: operation.to_string(),
                response_time_ms,
                success,
                timestamp: Utc::now(),
            },
        );
    }
}
