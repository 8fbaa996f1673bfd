//! Keyword-based classification of store failures
//!
//! Driver errors arrive as opaque text. The classifier lowercases the text and
//! walks an ordered rule table; the first rule with a matching keyword decides
//! the kind and whether retrying can help.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Low-level cause of a failed store operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConnectionError,
    TimeoutError,
    DeadlockError,
    ConstraintViolation,
    QueryError,
    PermissionError,
    StorageError,
    Unknown,
}

impl ErrorKind {
    /// Stable snake_case name, used for metric tags and JSON payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "connection_error",
            ErrorKind::TimeoutError => "timeout_error",
            ErrorKind::DeadlockError => "deadlock_error",
            ErrorKind::ConstraintViolation => "constraint_violation",
            ErrorKind::QueryError => "query_error",
            ErrorKind::PermissionError => "permission_error",
            ErrorKind::StorageError => "storage_error",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Whether a failure of this kind says something about the store's reachability
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConnectionError | ErrorKind::TimeoutError | ErrorKind::DeadlockError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorClassification {
    pub kind: ErrorKind,
    pub is_retryable: bool,
    pub suggested_action: String,
}

/// One row of the rule table
struct ClassificationRule {
    keywords: &'static [&'static str],
    kind: ErrorKind,
    retryable: bool,
    suggested_action: &'static str,
}

/// Ordered rule table. First match wins.
const RULES: &[ClassificationRule] = &[
    ClassificationRule {
        keywords: &["connection", "connect"],
        kind: ErrorKind::ConnectionError,
        retryable: true,
        suggested_action: "Check database connectivity and retry",
    },
    ClassificationRule {
        keywords: &["timeout", "timed out"],
        kind: ErrorKind::TimeoutError,
        retryable: true,
        suggested_action: "Retry the operation or increase the query timeout",
    },
    ClassificationRule {
        keywords: &["deadlock"],
        kind: ErrorKind::DeadlockError,
        retryable: true,
        suggested_action: "Retry the transaction",
    },
    ClassificationRule {
        keywords: &["constraint", "foreign key"],
        kind: ErrorKind::ConstraintViolation,
        retryable: false,
        suggested_action: "Check data integrity constraints before writing",
    },
    ClassificationRule {
        keywords: &["syntax", "column"],
        kind: ErrorKind::QueryError,
        retryable: false,
        suggested_action: "Review the query syntax and referenced columns",
    },
    ClassificationRule {
        keywords: &["permission", "access"],
        kind: ErrorKind::PermissionError,
        retryable: false,
        suggested_action: "Verify database role permissions",
    },
    ClassificationRule {
        keywords: &["disk", "space"],
        kind: ErrorKind::StorageError,
        retryable: false,
        suggested_action: "Free up database storage",
    },
];

const UNKNOWN_ACTION: &str = "Inspect the error details and logs";

/// Stateless failure classifier
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a failure from its display text
    pub fn classify<E: fmt::Display + ?Sized>(error: &E) -> ErrorClassification {
        Self::classify_message(&error.to_string())
    }

    /// Classify a raw error message
    pub fn classify_message(message: &str) -> ErrorClassification {
        let text = message.to_lowercase();

        RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|keyword| text.contains(keyword)))
            .map(|rule| ErrorClassification {
                kind: rule.kind,
                is_retryable: rule.retryable,
                suggested_action: rule.suggested_action.to_string(),
            })
            .unwrap_or_else(|| ErrorClassification {
                kind: ErrorKind::Unknown,
                is_retryable: false,
                suggested_action: UNKNOWN_ACTION.to_string(),
            })
    }
}
