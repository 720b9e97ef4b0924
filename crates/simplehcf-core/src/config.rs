//! Declarative client configuration.
//!
//! A [`ClientConfig`] describes the standard policy stack and transport
//! settings. Every field is optional in the serialized form:
//!
//! ```json
//! {
//!   "retry":     { "max_retries": 3, "delay_ms": 1000 },
//!   "timeout_ms": 4000,
//!   "transport": { "connect_timeout_ms": 2000 },
//!   "log":       { "level": "debug" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ClientError;
use crate::pipeline::PipelineBuilder;
use crate::policy::{
    CircuitBreakerConfig, CircuitBreakerPolicy, RetryConfig, RetryPolicy, TimeoutPolicy,
};
use crate::telemetry::LogConfig;

/// How retry delays grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    /// Same delay before every retry.
    #[default]
    Fixed,
    /// Delay doubles on each retry, capped at `max_delay_ms`.
    Exponential,
}

/// Retry policy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    #[serde(default)]
    pub backoff: BackoffKind,
    /// Cap for exponential growth, in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Random jitter as a fraction of the delay (0.0 = none)
    #[serde(default)]
    pub jitter: f64,
}

fn default_max_retries() -> u32 { 3 }
fn default_delay_ms() -> u64 { 1_000 }
fn default_max_delay_ms() -> u64 { 10_000 }

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            delay_ms: default_delay_ms(),
            backoff: BackoffKind::default(),
            max_delay_ms: default_max_delay_ms(),
            jitter: 0.0,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        let delay = Duration::from_millis(self.delay_ms);
        let mut config = match self.backoff {
            BackoffKind::Fixed => RetryConfig::fixed(self.max_retries, delay),
            BackoffKind::Exponential => {
                let mut c = RetryConfig::exponential(self.max_retries, delay);
                c.max_backoff = Duration::from_millis(self.max_delay_ms);
                c
            }
        };
        config.jitter_fraction = self.jitter;
        config
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_open_ms")]
    pub open_ms: u64,
    #[serde(default = "default_success_threshold")]
    pub success_threshold: u32,
}

fn default_failure_threshold() -> u32 { 5 }
fn default_open_ms() -> u64 { 30_000 }
fn default_success_threshold() -> u32 { 1 }

impl CircuitBreakerSettings {
    pub fn to_circuit_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            open_duration: Duration::from_millis(self.open_ms),
            success_threshold: self.success_threshold,
        }
    }
}

/// Settings for the underlying HTTP transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub pool_max_idle_per_host: Option<usize>,
}

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub retry: Option<RetrySettings>,
    /// Per-attempt timeout, in milliseconds
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub circuit_breaker: Option<CircuitBreakerSettings>,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl ClientConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Register the configured policies on `builder`, outermost first:
    /// retry, circuit breaker, timeout.
    pub fn apply_policies(&self, mut builder: PipelineBuilder) -> PipelineBuilder {
        if let Some(retry) = &self.retry {
            builder = builder.with_policy(RetryPolicy::new(retry.to_retry_config()));
        }
        if let Some(cb) = &self.circuit_breaker {
            builder = builder.with_policy(CircuitBreakerPolicy::new(
                "default",
                cb.to_circuit_breaker_config(),
            ));
        }
        if let Some(ms) = self.timeout_ms {
            builder = builder.with_policy(TimeoutPolicy::new(Duration::from_millis(ms)));
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = ClientConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.apply_policies(PipelineBuilder::new()).policy_count(), 0);
    }

    #[test]
    fn parses_full_document() {
        let config = ClientConfig::from_json_str(
            r#"{
                "retry": { "max_retries": 5, "delay_ms": 250, "backoff": "exponential" },
                "timeout_ms": 4000,
                "circuit_breaker": { "failure_threshold": 2 },
                "transport": { "user_agent": "simplehcf-test" },
                "log": { "level": "debug", "json": true }
            }"#,
        )
        .unwrap();

        let retry = config.retry.as_ref().unwrap();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.backoff, BackoffKind::Exponential);
        assert_eq!(retry.max_delay_ms, 10_000);
        assert_eq!(config.circuit_breaker.as_ref().unwrap().open_ms, 30_000);
        assert_eq!(config.transport.user_agent.as_deref(), Some("simplehcf-test"));
        assert!(config.log.json);
        assert_eq!(config.apply_policies(PipelineBuilder::new()).policy_count(), 3);
    }

    #[test]
    fn retry_settings_map_to_delays() {
        let fixed = RetrySettings { delay_ms: 500, ..Default::default() }.to_retry_config();
        assert_eq!(fixed.multiplier, 1.0);
        assert_eq!(fixed.max_backoff, Duration::from_millis(500));

        let exp = RetrySettings {
            delay_ms: 100,
            backoff: BackoffKind::Exponential,
            max_delay_ms: 800,
            ..Default::default()
        }
        .to_retry_config();
        let policy = RetryPolicy::new(exp);
        assert_eq!(policy.next_delay(2), Some(Duration::from_millis(200)));
        assert_eq!(policy.next_delay(3), Some(Duration::from_millis(400)));
    }

    #[test]
    fn huge_jitter_from_json_does_not_panic() {
        let config = ClientConfig::from_json_str(
            r#"{ "retry": { "max_retries": 1, "delay_ms": 1000, "jitter": 1e308 } }"#,
        )
        .unwrap();
        let policy = RetryPolicy::new(config.retry.unwrap().to_retry_config());
        let delay = policy.next_delay(1).unwrap();
        assert!(delay >= Duration::from_secs(1) && delay < Duration::from_secs(2));
    }

    #[test]
    fn invalid_document_is_config_error() {
        let err = ClientConfig::from_json_str(r#"{ "timeout_ms": "soon" }"#).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }
}
