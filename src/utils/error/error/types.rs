//! Error types for the data access core

use crate::utils::error::classifier::ErrorClassification;
use thiserror::Error;

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised by the sea-orm driver
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Driver-level failure reported as text
    #[error("Store error: {0}")]
    Store(String),

    /// Final failure of a managed operation, tagged with its classification
    #[error(
        "Operation '{operation}' failed after {attempts} attempt(s) [{}]: {source}",
        .classification.kind
    )]
    Query {
        operation: String,
        attempts: u32,
        classification: ErrorClassification,
        #[source]
        source: Box<CoreError>,
    },

    /// Fast-fail rejection while the circuit breaker is open
    #[error("Circuit breaker open: {0}")]
    CircuitOpen(String),

    /// The store cannot be reached and reconnection has given up
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Alert delivery errors
    #[error("Alert error: {0}")]
    Alert(String),

    /// Monitoring errors
    #[error("Monitoring error: {0}")]
    Monitoring(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
