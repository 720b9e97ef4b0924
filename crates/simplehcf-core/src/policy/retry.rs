//! Retry policy with fixed or exponential backoff and optional jitter.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use super::{describe, transient_http_error, OutcomePredicate, Policy};
use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

/// Configuration for the retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the first try).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff delay (caps exponential growth).
    pub max_backoff: Duration,
    /// Multiplier applied to backoff on each retry. `1.0` gives a fixed delay.
    pub multiplier: f64,
    /// Add up to `jitter_fraction * backoff` random jitter (0.0 = no jitter).
    /// Clamped to `[0.0, 1.0]`; a non-finite value disables jitter.
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

impl RetryConfig {
    /// Same `delay` before every retry, no jitter.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff: delay,
            max_backoff: delay,
            multiplier: 1.0,
            jitter_fraction: 0.0,
        }
    }

    /// Doubling delay starting at `initial_backoff`, default cap and jitter.
    pub fn exponential(max_retries: u32, initial_backoff: Duration) -> Self {
        Self {
            max_retries,
            initial_backoff,
            ..Self::default()
        }
    }
}

/// Re-runs the downstream pipeline while the outcome matches its condition.
///
/// When retries are exhausted the last outcome is returned as-is, so a
/// caller of an always-failing endpoint sees the final 5xx/408 response
/// rather than a synthetic error.
#[derive(Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
    condition: OutcomePredicate,
}

impl RetryPolicy {
    /// Retry on [`transient_http_error`].
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            condition: Arc::new(transient_http_error),
        }
    }

    /// Replace the retry condition.
    pub fn with_condition<F>(mut self, condition: F) -> Self
    where
        F: Fn(&Outcome) -> bool + Send + Sync + 'static,
    {
        self.condition = Arc::new(condition);
        self
    }

    /// Returns the delay before the `attempt`-th retry (1-based).
    /// Returns `None` if `attempt` exceeds `max_retries`.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if !self.should_retry(attempt) {
            return None;
        }
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.config.multiplier.powi(exponent);
        let max = self.config.max_backoff;
        let capped = if factor == 1.0 {
            self.config.initial_backoff.min(max)
        } else {
            Duration::try_from_secs_f64(self.config.initial_backoff.as_secs_f64() * factor)
                .map_or(max, |d| d.min(max))
        };

        let fraction = if self.config.jitter_fraction.is_finite() {
            self.config.jitter_fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let jitter_range = capped.mul_f64(fraction);
        let jitter = if jitter_range > Duration::ZERO {
            rand::thread_rng().gen_range(Duration::ZERO..jitter_range)
        } else {
            Duration::ZERO
        };

        Some(capped.saturating_add(jitter))
    }

    /// Returns `true` if any retries remain after `attempt` failures.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.config.max_retries
    }

    /// Returns `true` if `outcome` matches the retry condition.
    pub fn handles(&self, outcome: &Outcome) -> bool {
        (self.condition)(outcome)
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Policy for RetryPolicy {
    async fn execute(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        let mut attempt = 0u32;
        loop {
            let outcome = next.run(req.clone()).await;
            if !self.handles(&outcome) {
                return outcome;
            }
            attempt += 1;
            match self.next_delay(attempt) {
                Some(delay) => {
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        outcome = %describe(&outcome),
                        uri = %req.uri,
                        "retrying request"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(
                        attempts = attempt,
                        outcome = %describe(&outcome),
                        uri = %req.uri,
                        "max retries exceeded"
                    );
                    return outcome;
                }
            }
        }
    }

    fn name(&self) -> &str {
        "retry"
    }
}
