//! Optimistic timeout: drop the in-flight attempt once the deadline passes.

use std::time::Duration;

use async_trait::async_trait;

use super::Policy;
use crate::error::ClientError;
use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

/// Races the downstream pipeline against a timer.
///
/// On expiry the downstream future is dropped, which cancels whatever it was
/// awaiting (socket I/O, a retry sleep, ...), and
/// [`ClientError::Timeout`] is returned.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    timeout: Duration,
}

impl TimeoutPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Policy for TimeoutPolicy {
    async fn execute(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        let uri = req.uri.clone();
        match tokio::time::timeout(self.timeout, next.run(req)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let ms = self.timeout.as_millis() as u64;
                tracing::warn!(timeout_ms = ms, uri = %uri, "request timed out");
                Err(ClientError::Timeout { ms })
            }
        }
    }

    fn name(&self) -> &str {
        "timeout"
    }
}
