//! Helper functions for creating and inspecting errors

use super::types::CoreError;
use crate::utils::error::classifier::{ErrorClassification, ErrorClassifier, ErrorKind};

/// Helper functions for creating specific errors
impl CoreError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store(message.into())
    }

    pub fn circuit_open<S: Into<String>>(message: S) -> Self {
        Self::CircuitOpen(message.into())
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn alert<S: Into<String>>(message: S) -> Self {
        Self::Alert(message.into())
    }

    pub fn monitoring<S: Into<String>>(message: S) -> Self {
        Self::Monitoring(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Wrap the final failure of a managed operation with its classification
    pub fn query<S: Into<String>>(
        operation: S,
        attempts: u32,
        classification: ErrorClassification,
        source: CoreError,
    ) -> Self {
        Self::Query {
            operation: operation.into(),
            attempts,
            classification,
            source: Box::new(source),
        }
    }
}

/// Inspection helpers
impl CoreError {
    /// Classification of this error
    ///
    /// Already-classified errors return their stored classification; synthesized
    /// availability errors are reported as retryable connection failures.
    pub fn classification(&self) -> ErrorClassification {
        match self {
            Self::Query { classification, .. } => classification.clone(),
            Self::CircuitOpen(_) | Self::Unavailable(_) => ErrorClassification {
                kind: ErrorKind::ConnectionError,
                is_retryable: true,
                suggested_action: "Wait for the store to recover before retrying".to_string(),
            },
            other => ErrorClassifier::classify(other),
        }
    }

    /// Classified kind of this error
    pub fn kind(&self) -> ErrorKind {
        self.classification().kind
    }

    /// Whether the error says the store itself is unhealthy
    pub fn is_transient(&self) -> bool {
        match self {
            Self::CircuitOpen(_) | Self::Unavailable(_) => false,
            other => other.kind().is_transient(),
        }
    }

    /// Whether this is a synthesized circuit breaker rejection
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen(_))
    }

    /// The innermost error of a classified wrapper
    pub fn root(&self) -> &CoreError {
        match self {
            Self::Query { source, .. } => source.root(),
            other => other,
        }
    }

    /// Suggested HTTP status code for API-layer callers
    pub fn status_code(&self) -> u16 {
        match self {
            Self::CircuitOpen(_) | Self::Unavailable(_) => 503,
            Self::NotFound(_) => 404,
            Self::Config(_) | Self::Internal(_) => 500,
            other => match other.kind() {
                ErrorKind::ConstraintViolation => 409,
                ErrorKind::QueryError => 400,
                ErrorKind::PermissionError => 403,
                ErrorKind::TimeoutError => 408,
                ErrorKind::ConnectionError => 503,
                ErrorKind::DeadlockError | ErrorKind::StorageError | ErrorKind::Unknown => 500,
            },
        }
    }
}
