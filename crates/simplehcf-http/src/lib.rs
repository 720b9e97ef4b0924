//! simplehcf-http: `reqwest`-backed client factory.
//!
//! Wraps a [`simplehcf_core::PipelineBuilder`] with transport settings and
//! produces clients that send through a shared `reqwest` connection pool.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use simplehcf_core::{RetryConfig, RetryPolicy, TimeoutPolicy, TrafficRecorderMessageHandler};
//! use simplehcf_http::HttpClientFactoryBuilder;
//!
//! # async fn demo() -> Result<(), simplehcf_core::ClientError> {
//! let recorder = TrafficRecorderMessageHandler::new();
//! let client = HttpClientFactoryBuilder::create()
//!     .with_policy(RetryPolicy::new(RetryConfig::fixed(3, Duration::from_secs(1))))
//!     .with_policy(TimeoutPolicy::new(Duration::from_secs(4)))
//!     .with_message_handler(recorder.clone())
//!     .build()?
//!     .create_client();
//!
//! let resp = client.get("http://localhost:8080/hello/world").await?;
//! println!("{} after {} attempt(s)", resp.status, recorder.traffic().len());
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod transport;

pub use factory::{HttpClientFactory, HttpClientFactoryBuilder};
pub use transport::ReqwestTransport;
