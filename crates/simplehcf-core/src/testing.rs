//! In-process test doubles shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use http::StatusCode;

use crate::error::ClientError;
use crate::handler::{MessageHandler, VisitLog};
use crate::pipeline::{Next, Outcome};
use crate::policy::Policy;
use crate::request::{HttpRequest, HttpResponse};
use crate::transport::HttpTransport;

/// One scripted transport reply.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(StatusCode),
    Fail(&'static str),
}

struct MockInner {
    script: Vec<Step>,
    calls: AtomicUsize,
    requests: Mutex<Vec<HttpRequest>>,
}

/// Transport replaying a script; the last step repeats forever.
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<MockInner>,
    delay: Option<Duration>,
}

impl MockTransport {
    pub fn scripted(script: Vec<Step>) -> Self {
        assert!(!script.is_empty(), "script needs at least one step");
        Self {
            inner: Arc::new(MockInner {
                script,
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
            }),
            delay: None,
        }
    }

    pub fn always(status: StatusCode) -> Self {
        Self::scripted(vec![Step::Respond(status)])
    }

    pub fn failing(message: &'static str) -> Self {
        Self::scripted(vec![Step::Fail(message)])
    }

    /// Sleep for `delay` before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.inner.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let index = self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.requests.lock().unwrap().push(req);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let step = &self.inner.script[index.min(self.inner.script.len() - 1)];
        match step {
            Step::Respond(status) => Ok(HttpResponse::new(*status)
                .with_body(status.canonical_reason().unwrap_or_default())),
            Step::Fail(message) => Err(ClientError::Transport((*message).to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Handler writing `name` on the way in and `name:back` on the way out.
pub struct RecordingHandler {
    name: &'static str,
    visits: VisitLog,
}

impl RecordingHandler {
    pub fn new(name: &'static str, visits: VisitLog) -> Self {
        Self { name, visits }
    }
}

#[async_trait]
impl MessageHandler for RecordingHandler {
    async fn handle(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        self.visits.record(self.name);
        let outcome = next.run(req).await;
        self.visits.record(&format!("{}:back", self.name));
        outcome
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Policy counterpart of [`RecordingHandler`]; calls `next` exactly once.
pub struct RecordingPolicy {
    name: &'static str,
    visits: VisitLog,
}

impl RecordingPolicy {
    pub fn new(name: &'static str, visits: VisitLog) -> Self {
        Self { name, visits }
    }
}

#[async_trait]
impl Policy for RecordingPolicy {
    async fn execute(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        self.visits.record(self.name);
        let outcome = next.run(req).await;
        self.visits.record(&format!("{}:back", self.name));
        outcome
    }

    fn name(&self) -> &str {
        self.name
    }
}
