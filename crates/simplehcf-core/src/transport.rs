//! The `HttpTransport` trait: the terminal step of every pipeline.

use async_trait::async_trait;

use crate::error::ClientError;
use crate::request::{HttpRequest, HttpResponse};

/// The async trait every transport must implement.
///
/// A transport performs exactly one network round trip per call. Retries,
/// timeouts and middleware are layered on top by the pipeline.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn HttpTransport>`.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Send a single request and return the buffered response.
    ///
    /// Non-2xx statuses are returned as `Ok`; only connection-level failures
    /// are `Err`.
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError>;

    /// Return the transport's identifier, used in log fields.
    fn name(&self) -> &str {
        "transport"
    }
}
