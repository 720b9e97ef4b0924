//! Message handlers: the middleware stages between policies and transport.
//!
//! A handler receives the request together with [`Next`], the rest of the
//! chain. It may mutate the request, must forward it (or produce an outcome
//! itself), and may inspect the outcome on the way back:
//!
//! ```text
//! handler[0] ──req──▶ handler[1] ──req──▶ … ──req──▶ transport
//!            ◀─resp──            ◀─resp──     ◀─resp──
//! ```
//!
//! Handlers should never swallow errors; whatever `next` returns is what the
//! policies above expect to see.

pub mod event;
pub mod header;
pub mod log;
pub mod traffic;

use std::sync::Arc;

use async_trait::async_trait;

use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

pub use event::{EventMessageHandler, RequestEvent};
pub use header::HeaderMessageHandler;
pub use log::{TrafficLog, VisitLog};
pub use traffic::TrafficRecorderMessageHandler;

/// A single middleware stage.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// Process `req`, normally by calling `next.run(req)`.
    async fn handle(&self, req: HttpRequest, next: Next<'_>) -> Outcome;

    /// Short identifier used in logs and `Debug` output.
    fn name(&self) -> &str {
        "handler"
    }
}

#[async_trait]
impl<T: MessageHandler + ?Sized> MessageHandler for Arc<T> {
    async fn handle(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        (**self).handle(req, next).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
