//! Policy engine: resilience decorators around the downstream pipeline.
//!
//! Policies are applied in registration order, outermost first:
//! ```text
//! Request → [RetryPolicy] → [CircuitBreakerPolicy] → [TimeoutPolicy] → handlers → Transport
//! ```
//! With retry outside timeout, each attempt gets its own deadline. Reverse
//! them and the deadline covers all attempts plus the delays between them.

pub mod circuit_breaker;
pub mod retry;
pub mod timeout;

use std::sync::Arc;

use async_trait::async_trait;
use http::StatusCode;

use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

pub use circuit_breaker::{CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState};
pub use retry::{RetryConfig, RetryPolicy};
pub use timeout::TimeoutPolicy;

/// A resilience decorator.
///
/// Unlike a message handler, a policy may call `next.run` zero times
/// (reject), once (timeout, circuit breaker) or repeatedly (retry).
#[async_trait]
pub trait Policy: Send + Sync + 'static {
    async fn execute(&self, req: HttpRequest, next: Next<'_>) -> Outcome;

    /// Short identifier used in logs and `Debug` output.
    fn name(&self) -> &str {
        "policy"
    }
}

#[async_trait]
impl<T: Policy + ?Sized> Policy for Arc<T> {
    async fn execute(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        (**self).execute(req, next).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Decides whether an outcome counts as a failure for a policy.
pub type OutcomePredicate = Arc<dyn Fn(&Outcome) -> bool + Send + Sync>;

/// Transport errors, any status >= 500, and 408 Request Timeout.
pub fn transient_http_error(outcome: &Outcome) -> bool {
    match outcome {
        Ok(resp) => {
            resp.status.as_u16() >= 500 || resp.status == StatusCode::REQUEST_TIMEOUT
        }
        Err(e) => e.is_retryable(),
    }
}

/// One-line summary of an outcome for log fields.
pub(crate) fn describe(outcome: &Outcome) -> String {
    match outcome {
        Ok(resp) => format!("HTTP {}", resp.status.as_u16()),
        Err(e) => e.to_string(),
    }
}
