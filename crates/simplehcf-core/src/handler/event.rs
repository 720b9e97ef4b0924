//! Handler publishing every request it forwards to subscribed channels.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::log::VisitLog;
use super::MessageHandler;
use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

/// Emitted once per handler invocation, before the request is forwarded.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    /// The request as it looked at this point in the chain, including any
    /// headers set by earlier handlers.
    pub request: HttpRequest,
}

/// Publishes a [`RequestEvent`] to every subscriber, then forwards.
///
/// Subscribers are plain tokio channels; a subscriber whose receiver has
/// been dropped is pruned on the next emission. Cloning the handler shares
/// the subscriber list, so a clone kept outside the pipeline can subscribe
/// after the client is built.
#[derive(Debug, Clone, Default)]
pub struct EventMessageHandler {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<RequestEvent>>>>,
    visits: Option<VisitLog>,
}

impl EventMessageHandler {
    pub const NAME: &'static str = "event";

    pub fn new() -> Self {
        Self::default()
    }

    /// Also record [`Self::NAME`] into `visits` on every invocation.
    pub fn with_visit_log(mut self, visits: VisitLog) -> Self {
        self.visits = Some(visits);
        self
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<RequestEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Number of live subscribers as of the last emission.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver one event per live subscriber; returns how many received it.
    fn emit(&self, req: &HttpRequest) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| {
            tx.send(RequestEvent {
                request: req.clone(),
            })
            .is_ok()
        });
        subscribers.len()
    }
}

#[async_trait]
impl MessageHandler for EventMessageHandler {
    async fn handle(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        if let Some(visits) = &self.visits {
            visits.record(Self::NAME);
        }
        let delivered = self.emit(&req);
        tracing::trace!(delivered, uri = %req.uri, "request event emitted");
        next.run(req).await
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::HeaderMessageHandler;
    use crate::pipeline::PipelineBuilder;
    use crate::testing::MockTransport;
    use http::StatusCode;

    #[tokio::test]
    async fn one_event_per_invocation() {
        let events = EventMessageHandler::new();
        let mut rx = events.subscribe();
        let client = PipelineBuilder::new()
            .with_message_handler(events.clone())
            .build(MockTransport::always(StatusCode::OK));

        client.get("http://localhost/one").await.unwrap();
        client.get("http://localhost/two").await.unwrap();

        assert_eq!(rx.recv().await.unwrap().request.uri.path(), "/one");
        assert_eq!(rx.recv().await.unwrap().request.uri.path(), "/two");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn event_carries_headers_from_earlier_handlers_only() {
        let events = EventMessageHandler::new();
        let mut rx = events.subscribe();
        let client = PipelineBuilder::new()
            .with_message_handler(HeaderMessageHandler::new("foobar", "foobar").unwrap())
            .with_message_handler(events.clone())
            .with_message_handler(HeaderMessageHandler::new("x-late", "1").unwrap())
            .build(MockTransport::always(StatusCode::OK));

        client.get("http://localhost/").await.unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.request.header("foobar"), Some("foobar"));
        assert!(event.request.header("x-late").is_none());
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let events = EventMessageHandler::new();
        let mut a = events.subscribe();
        let mut b = events.subscribe();
        let client = PipelineBuilder::new()
            .with_message_handler(events.clone())
            .build(MockTransport::always(StatusCode::OK));

        client.get("http://localhost/").await.unwrap();

        assert!(a.recv().await.is_some());
        assert!(b.recv().await.is_some());
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned() {
        let events = EventMessageHandler::new();
        let keep = events.subscribe();
        drop(events.subscribe());
        assert_eq!(events.subscriber_count(), 2);

        let client = PipelineBuilder::new()
            .with_message_handler(events.clone())
            .build(MockTransport::always(StatusCode::OK));
        client.get("http://localhost/").await.unwrap();

        assert_eq!(events.subscriber_count(), 1);
        drop(keep);
    }
}
