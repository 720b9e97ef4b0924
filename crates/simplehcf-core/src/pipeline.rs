//! Pipeline composition: policies outside, message handlers inside, transport last.
//!
//! ```text
//! send(req)
//!   → policy[0] → … → policy[n-1]        (first registered = outermost)
//!   → handler[0] → … → handler[m-1]       (registration order)
//!   → transport.send(req)
//! ```
//!
//! Responses unwind through the same stages in reverse.

use std::fmt;
use std::sync::Arc;

use crate::error::ClientError;
use crate::handler::MessageHandler;
use crate::policy::Policy;
use crate::request::{HttpRequest, HttpResponse};
use crate::transport::HttpTransport;

/// What a pipeline stage yields: a response, or the error that replaced it.
pub type Outcome = Result<HttpResponse, ClientError>;

/// The remainder of a pipeline, from the current stage down to the transport.
///
/// Policies and handlers receive a `Next` and decide whether (and how often)
/// to call [`Next::run`]. It is `Copy`, so a retry policy can run it once per
/// attempt.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    policies: &'a [Arc<dyn Policy>],
    handlers: &'a [Arc<dyn MessageHandler>],
    transport: &'a dyn HttpTransport,
}

impl<'a> Next<'a> {
    /// Pass `req` to the next stage and await its outcome.
    pub async fn run(self, req: HttpRequest) -> Outcome {
        if let Some((policy, policies)) = self.policies.split_first() {
            let next = Next { policies, ..self };
            return policy.execute(req, next).await;
        }
        if let Some((handler, handlers)) = self.handlers.split_first() {
            let next = Next { handlers, ..self };
            return handler.handle(req, next).await;
        }
        tracing::debug!(
            transport = self.transport.name(),
            method = %req.method,
            uri = %req.uri,
            "sending request"
        );
        self.transport.send(req).await
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("policies", &self.policies.len())
            .field("handlers", &self.handlers.len())
            .field("transport", &self.transport.name())
            .finish()
    }
}

/// Accumulates policies and message handlers, then binds them to a transport.
///
/// Registration order is preserved. Policies always wrap the whole handler
/// chain, regardless of the order in which the two kinds are registered.
#[derive(Clone, Default)]
pub struct PipelineBuilder {
    policies: Vec<Arc<dyn Policy>>,
    handlers: Vec<Arc<dyn MessageHandler>>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a policy. Earlier policies wrap later ones.
    pub fn with_policy(mut self, policy: impl Policy) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    /// Append a message handler. Handlers see requests in registration order.
    pub fn with_message_handler(mut self, handler: impl MessageHandler) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Freeze the configuration into a client sending through `transport`.
    pub fn build(self, transport: impl HttpTransport) -> HttpClient {
        self.build_shared(Arc::new(transport))
    }

    /// Like [`build`](Self::build), for a transport already behind an `Arc`.
    pub fn build_shared(self, transport: Arc<dyn HttpTransport>) -> HttpClient {
        tracing::debug!(
            policies = self.policies.len(),
            handlers = self.handlers.len(),
            transport = transport.name(),
            "pipeline built"
        );
        HttpClient {
            inner: Arc::new(Pipeline {
                policies: self.policies,
                handlers: self.handlers,
                transport,
            }),
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("policies", &names(self.policies.iter().map(|p| p.name())))
            .field("handlers", &names(self.handlers.iter().map(|h| h.name())))
            .finish()
    }
}

fn names<'a>(iter: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    iter.collect()
}

struct Pipeline {
    policies: Vec<Arc<dyn Policy>>,
    handlers: Vec<Arc<dyn MessageHandler>>,
    transport: Arc<dyn HttpTransport>,
}

/// An immutable, cheaply cloneable client.
///
/// Clones share the same pipeline and may be used concurrently.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<Pipeline>,
}

impl HttpClient {
    /// Send `req` through every policy and handler, then the transport.
    ///
    /// Dropping the returned future cancels the request, including any
    /// pending retry delay.
    pub async fn send(&self, req: HttpRequest) -> Outcome {
        self.entry().run(req).await
    }

    /// Convenience: `GET uri`.
    pub async fn get(&self, uri: &str) -> Outcome {
        let req = HttpRequest::get(uri)?;
        self.send(req).await
    }

    fn entry(&self) -> Next<'_> {
        Next {
            policies: self.inner.policies.as_slice(),
            handlers: self.inner.handlers.as_slice(),
            transport: self.inner.transport.as_ref(),
        }
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("policies", &self.inner.policies.len())
            .field("handlers", &self.inner.handlers.len())
            .field("transport", &self.inner.transport.name())
            .finish()
    }
}
