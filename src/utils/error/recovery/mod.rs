//! Error recovery and resilience utilities
//!
//! This module provides retry with exponential backoff and circuit breaking.

mod circuit_breaker;
mod retry;
mod types;

pub use circuit_breaker::{CircuitBreaker, FailurePredicate};
pub use retry::{DEFAULT_POLICY, RetryPolicies, RetryPolicy};
pub use types::{CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState, RetryConfig};
