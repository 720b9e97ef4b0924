//! Three-state circuit breaker: Closed → Open → Half-Open.
//!
//! State transitions:
//! - `Closed` → `Open`:     consecutive failures reach `failure_threshold`
//! - `Open` → `Half-Open`:  `open_duration` has elapsed
//! - `Half-Open` → `Closed`: `success_threshold` probes succeed
//! - `Half-Open` → `Open`:   a probe fails
//!
//! While open, requests are rejected with [`ClientError::CircuitOpen`]
//! without touching the downstream pipeline.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::{describe, transient_http_error, OutcomePredicate, Policy};
use crate::error::ClientError;
use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Normal operation.
    Closed,
    /// All requests rejected. Wait for `open_duration` before probing.
    Open,
    /// Probe requests allowed to test downstream health.
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

/// Configuration for the circuit breaker.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening.
    pub failure_threshold: u32,
    /// How long to stay open before transitioning to half-open.
    pub open_duration: Duration,
    /// Number of successful half-open probes before closing.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_duration: Duration::from_secs(30),
            success_threshold: 1,
        }
    }
}

struct CircuitInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe circuit breaker policy.
///
/// Clones share state, so one breaker can guard several clients talking to
/// the same upstream.
#[derive(Clone)]
pub struct CircuitBreakerPolicy {
    name: String,
    config: CircuitBreakerConfig,
    condition: OutcomePredicate,
    inner: Arc<Mutex<CircuitInner>>,
}

impl CircuitBreakerPolicy {
    /// Create a breaker in `Closed` state counting [`transient_http_error`]
    /// outcomes as failures.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            condition: Arc::new(transient_http_error),
            inner: Arc::new(Mutex::new(CircuitInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            })),
        }
    }

    /// Replace the failure condition.
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Outcome) -> bool + Send + Sync + 'static,
    {
        self.condition = Arc::new(condition);
        self
    }

    fn lock(&self) -> MutexGuard<'_, CircuitInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current state, transitioning Open→HalfOpen if the wait has elapsed.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        if inner.state == CircuitState::Open {
            if let Some(opened_at) = inner.opened_at {
                if opened_at.elapsed() >= self.config.open_duration {
                    inner.state = CircuitState::HalfOpen;
                    inner.success_count = 0;
                    tracing::info!(circuit = %self.name, "circuit breaker → half-open");
                }
            }
        }
        inner.state
    }

    /// Returns `true` if the circuit allows the request through.
    pub fn is_allowed(&self) -> bool {
        self.state() != CircuitState::Open
    }

    /// Record a successful request.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.opened_at = None;
                    tracing::info!(circuit = %self.name, "circuit breaker → closed");
                }
            }
            CircuitState::Closed => {
                inner.failure_count = 0;
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed request.
    pub fn record_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    tracing::warn!(
                        circuit = %self.name,
                        failures = inner.failure_count,
                        "circuit breaker → open"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.success_count = 0;
                tracing::warn!(circuit = %self.name, "circuit breaker probe failed → open");
            }
            CircuitState::Open => {}
        }
    }
}

impl fmt::Debug for CircuitBreakerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerPolicy")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}

#[async_trait]
impl Policy for CircuitBreakerPolicy {
    async fn execute(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        if !self.is_allowed() {
            tracing::debug!(circuit = %self.name, uri = %req.uri, "rejected by open circuit");
            return Err(ClientError::CircuitOpen {
                name: self.name.clone(),
            });
        }

        let outcome = next.run(req).await;
        if (self.condition)(&outcome) {
            tracing::debug!(circuit = %self.name, outcome = %describe(&outcome), "failure recorded");
            self.record_failure();
        } else {
            self.record_success();
        }
        outcome
    }

    fn name(&self) -> &str {
        "circuit-breaker"
    }
}
