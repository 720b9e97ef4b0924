//! simplehcf-core: pipeline builder, message handlers and policies.
//!
//! # Overview
//!
//! A client built here sends each request through three tiers:
//!
//! 1. **Policies** ([`policy`]): retry, circuit breaker, timeout. The first
//!    registered policy is the outermost.
//! 2. **Message handlers** ([`handler`]): middleware that may inspect or
//!    mutate the request and observe the outcome. Invoked in registration
//!    order.
//! 3. **Transport** ([`HttpTransport`]): one network round trip.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use simplehcf_core::{
//!     EventMessageHandler, HttpTransport, PipelineBuilder, RetryConfig, RetryPolicy,
//!     TimeoutPolicy,
//! };
//!
//! # async fn demo(transport: impl HttpTransport) -> Result<(), simplehcf_core::ClientError> {
//! let events = EventMessageHandler::new();
//! let mut requests = events.subscribe();
//!
//! let client = PipelineBuilder::new()
//!     .with_policy(RetryPolicy::new(RetryConfig::fixed(3, Duration::from_secs(1))))
//!     .with_policy(TimeoutPolicy::new(Duration::from_secs(4)))
//!     .with_message_handler(events)
//!     .build(transport);
//!
//! let resp = client.get("http://localhost:8080/hello/world").await?;
//! let first = requests.recv().await;
//! # let _ = (resp, first);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod pipeline;
pub mod policy;
pub mod request;
pub mod telemetry;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::{BackoffKind, ClientConfig, RetrySettings, TransportConfig};
pub use error::ClientError;
pub use handler::{
    EventMessageHandler, HeaderMessageHandler, MessageHandler, RequestEvent, TrafficLog,
    TrafficRecorderMessageHandler, VisitLog,
};
pub use pipeline::{HttpClient, Next, Outcome, PipelineBuilder};
pub use policy::{
    transient_http_error, CircuitBreakerConfig, CircuitBreakerPolicy, CircuitState, Policy,
    RetryConfig, RetryPolicy, TimeoutPolicy,
};
pub use request::{HttpRequest, HttpResponse};
pub use telemetry::{init_tracing, LogConfig};
pub use transport::HttpTransport;
