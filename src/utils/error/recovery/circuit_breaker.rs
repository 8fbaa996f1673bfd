//! Circuit breaker implementation for fault tolerance

use super::types::{CircuitBreakerConfig, CircuitBreakerSnapshot, CircuitState};
use crate::utils::error::{CoreError, Result};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Decides whether an error counts against the circuit
pub type FailurePredicate = fn(&CoreError) -> bool;

fn count_every_failure(_: &CoreError) -> bool {
    true
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_time: Option<Instant>,
    last_failure_at: Option<chrono::DateTime<chrono::Utc>>,
    probe_started: Option<Instant>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_time: None,
            last_failure_at: None,
            probe_started: None,
        }
    }
}

/// Circuit breaker guarding a single logical resource
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    rejections: AtomicU64,
    counts_as_failure: FailurePredicate,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    pub fn new<S: Into<String>>(name: S, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState::closed()),
            rejections: AtomicU64::new(0),
            counts_as_failure: count_every_failure,
        }
    }

    /// Only errors matching `predicate` move the circuit towards open
    pub fn with_failure_predicate(mut self, predicate: FailurePredicate) -> Self {
        self.counts_as_failure = predicate;
        self
    }

    /// Execute a future with circuit breaker protection
    pub async fn guard<F, T>(&self, f: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.try_acquire()?;

        match f.await {
            Ok(result) => {
                self.on_success();
                Ok(result)
            }
            Err(error) => {
                if (self.counts_as_failure)(&error) {
                    self.on_failure();
                } else {
                    self.on_ignored_failure();
                }
                Err(error)
            }
        }
    }

    /// Admit or reject a call
    ///
    /// An open circuit whose cooldown has elapsed moves to half-open and admits
    /// exactly one probe; further calls are rejected until the probe reports back.
    pub fn try_acquire(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        match inner.state {
            CircuitState::Closed => Ok(()),
            CircuitState::Open => {
                let cooled_down = inner
                    .last_failure_time
                    .map(|at| now.duration_since(at) >= self.config.cooldown)
                    .unwrap_or(true);

                if cooled_down {
                    debug!(breaker = %self.name, "Circuit breaker transitioning from Open to HalfOpen");
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_started = Some(now);
                    Ok(())
                } else {
                    drop(inner);
                    Err(self.reject())
                }
            }
            CircuitState::HalfOpen => {
                // A probe that never reported back (cancelled caller) expires after one cooldown
                let probe_stale = inner
                    .probe_started
                    .map(|at| now.duration_since(at) >= self.config.cooldown)
                    .unwrap_or(true);

                if probe_stale {
                    inner.probe_started = Some(now);
                    Ok(())
                } else {
                    drop(inner);
                    Err(self.reject())
                }
            }
        }
    }

    fn reject(&self) -> CoreError {
        self.rejections.fetch_add(1, Ordering::Relaxed);
        CoreError::circuit_open(format!(
            "'{}' is rejecting calls after repeated failures",
            self.name
        ))
    }

    /// Record a successful call
    ///
    /// A success landing while the circuit is open came from a call admitted
    /// before it opened; only the half-open probe may close it.
    pub fn on_success(&self) {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Open => {
                debug!(breaker = %self.name, "Ignoring late success while circuit is open");
                return;
            }
            CircuitState::HalfOpen => {
                info!(breaker = %self.name, "Circuit breaker transitioning from HalfOpen to Closed");
            }
            CircuitState::Closed => {}
        }
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.probe_started = None;
    }

    /// Record a counted failure
    pub fn on_failure(&self) {
        let mut inner = self.inner.lock();
        let now = Instant::now();

        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                inner.last_failure_time = Some(now);
                inner.last_failure_at = Some(chrono::Utc::now());

                if inner.failure_count >= self.config.failure_threshold {
                    warn!(
                        breaker = %self.name,
                        failures = inner.failure_count,
                        "Circuit breaker opening after {} consecutive failures",
                        inner.failure_count
                    );
                    inner.state = CircuitState::Open;
                }
            }
            CircuitState::HalfOpen => {
                warn!(breaker = %self.name, "Circuit breaker probe failed, reopening");
                inner.failure_count += 1;
                inner.state = CircuitState::Open;
                inner.last_failure_time = Some(now);
                inner.last_failure_at = Some(chrono::Utc::now());
                inner.probe_started = None;
            }
            // Late completion of a call admitted before the circuit opened
            CircuitState::Open => {}
        }
    }

    /// Record a failure that says nothing about the resource's health
    fn on_ignored_failure(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen {
            // Let the next call probe again
            inner.probe_started = None;
        }
    }

    /// Force the circuit closed (operator recovery)
    pub fn reset(&self) {
        *self.inner.lock() = BreakerState::closed();
        info!(breaker = %self.name, "Circuit breaker reset");
    }

    /// Get current circuit breaker state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a snapshot of the breaker
    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let inner = self.inner.lock();
        CircuitBreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            is_open: inner.state == CircuitState::Open,
            failure_count: inner.failure_count,
            last_failure_time: inner.last_failure_at,
            threshold: self.config.failure_threshold,
            cooldown_ms: self.config.cooldown.as_millis() as u64,
            total_rejections: self.rejections.load(Ordering::Relaxed),
        }
    }
}
