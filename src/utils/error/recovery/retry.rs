//! Retry mechanism with exponential backoff

use super::types::RetryConfig;
use crate::utils::error::{CoreError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Name of the policy used when a caller asks for one that does not exist
pub const DEFAULT_POLICY: &str = "database";

/// Retry mechanism with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    name: String,
    config: RetryConfig,
}

impl RetryPolicy {
    /// Create a new retry policy
    pub fn new<S: Into<String>>(name: S, config: RetryConfig) -> Self {
        Self {
            name: name.into(),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Delay before retrying after `attempt` failed (1-based), without jitter
    ///
    /// `min(base * 2^(attempt - 1), max)` for exponential policies, `min(base, max)` otherwise.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.config.base_delay_ms;
        let max = self.config.max_delay_ms;

        let delay = if self.config.exponential_backoff {
            let exponent = attempt.saturating_sub(1).min(63);
            base.saturating_mul(1u64 << exponent)
        } else {
            base
        };

        Duration::from_millis(delay.min(max))
    }

    /// Backoff delay plus optional jitter, still capped at the maximum delay
    pub(crate) fn retry_delay(&self, attempt: u32) -> Duration {
        let delay = self.backoff_delay(attempt);
        if !self.config.jitter {
            return delay;
        }

        let jitter = delay.as_millis() as f64 * 0.1 * rand::random::<f64>();
        let jittered = Duration::from_millis((delay.as_millis() as f64 + jitter) as u64);
        jittered.min(self.config.max_delay())
    }

    /// Execute an operation with retry logic
    ///
    /// Non-retryable failures and the failure of the final attempt are returned
    /// immediately, wrapped with their classification and the attempt count.
    pub async fn call<F, Fut, T>(&self, context: &str, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(
                            policy = %self.name,
                            context,
                            "Retry succeeded on attempt {}",
                            attempt
                        );
                    }
                    return Ok(result);
                }
                Err(error) => error,
            };

            // Already classified further down the stack
            if matches!(error, CoreError::Query { .. } | CoreError::CircuitOpen(_)) {
                return Err(error);
            }

            let classification = error.classification();

            if !classification.is_retryable {
                debug!(
                    policy = %self.name,
                    context,
                    kind = %classification.kind,
                    "Non-retryable failure on attempt {}: {}",
                    attempt,
                    error
                );
                return Err(CoreError::query(context, attempt, classification, error));
            }

            if attempt >= max_attempts {
                error!(
                    policy = %self.name,
                    context,
                    kind = %classification.kind,
                    "Retry failed after {} attempts: {}",
                    attempt,
                    error
                );
                return Err(CoreError::query(context, attempt, classification, error));
            }

            let delay = self.retry_delay(attempt);
            warn!(
                policy = %self.name,
                context,
                kind = %classification.kind,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Attempt {} failed: {}, retrying in {:?}",
                attempt,
                error,
                delay
            );

            tokio::time::sleep(delay).await;
        }
    }
}

/// Registry of named retry policies (`database`, `ai_service`, `integration`, ...)
#[derive(Debug, Clone)]
pub struct RetryPolicies {
    policies: HashMap<String, RetryPolicy>,
}

impl RetryPolicies {
    /// Build the registry from configured policies
    pub fn new(configs: &HashMap<String, RetryConfig>) -> Self {
        let policies = configs
            .iter()
            .map(|(name, config)| (name.clone(), RetryPolicy::new(name.clone(), config.clone())))
            .collect();
        Self { policies }
    }

    /// Look up a policy by name, falling back to the database policy
    pub fn policy(&self, name: &str) -> RetryPolicy {
        if let Some(policy) = self.policies.get(name) {
            return policy.clone();
        }

        warn!("Unknown retry policy '{}', using '{}'", name, DEFAULT_POLICY);
        self.policies
            .get(DEFAULT_POLICY)
            .cloned()
            .unwrap_or_else(|| RetryPolicy::new(DEFAULT_POLICY, RetryConfig::default()))
    }

    /// Run an operation under the named policy
    pub async fn with_retry<F, Fut, T>(&self, operation: F, policy_name: &str, context: &str) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.policy(policy_name).call(context, operation).await
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.policies.keys().cloned().collect();
        names.sort();
        names
    }
}
