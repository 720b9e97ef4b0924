//! Handler recording every request it forwards.

use async_trait::async_trait;

use super::log::{TrafficLog, VisitLog};
use super::MessageHandler;
use crate::pipeline::{Next, Outcome};
use crate::request::HttpRequest;

/// Appends each observed request to a [`TrafficLog`], then forwards it
/// unchanged.
///
/// Placed below a retry policy it records one entry per attempt.
#[derive(Debug, Clone, Default)]
pub struct TrafficRecorderMessageHandler {
    log: TrafficLog,
    visits: Option<VisitLog>,
}

impl TrafficRecorderMessageHandler {
    pub const NAME: &'static str = "traffic-recorder";

    /// Recorder with its own, fresh log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorder appending to an existing, possibly shared, log.
    pub fn with_log(log: TrafficLog) -> Self {
        Self { log, visits: None }
    }

    /// Also record [`Self::NAME`] into `visits` on every invocation.
    pub fn with_visit_log(mut self, visits: VisitLog) -> Self {
        self.visits = Some(visits);
        self
    }

    /// Every request recorded so far, oldest first.
    pub fn traffic(&self) -> Vec<HttpRequest> {
        self.log.entries()
    }

    pub fn log(&self) -> &TrafficLog {
        &self.log
    }
}

#[async_trait]
impl MessageHandler for TrafficRecorderMessageHandler {
    async fn handle(&self, req: HttpRequest, next: Next<'_>) -> Outcome {
        if let Some(visits) = &self.visits {
            visits.record(Self::NAME);
        }
        self.log.record(&req);
        next.run(req).await
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::EventMessageHandler;
    use crate::pipeline::PipelineBuilder;
    use crate::testing::{MockTransport, Step};
    use http::StatusCode;

    #[tokio::test]
    async fn records_requests_in_order() {
        let recorder = TrafficRecorderMessageHandler::new();
        let client = PipelineBuilder::new()
            .with_message_handler(recorder.clone())
            .build(MockTransport::always(StatusCode::OK));

        for path in ["/a", "/b", "/c"] {
            client.get(&format!("http://localhost{path}")).await.unwrap();
        }

        let paths: Vec<_> = recorder
            .traffic()
            .iter()
            .map(|r| r.uri.path().to_owned())
            .collect();
        assert_eq!(paths, vec!["/a", "/b", "/c"]);
    }

    #[tokio::test]
    async fn records_failed_requests_too() {
        let recorder = TrafficRecorderMessageHandler::new();
        let client = PipelineBuilder::new()
            .with_message_handler(recorder.clone())
            .build(MockTransport::scripted(vec![Step::Fail("refused")]));

        assert!(client.get("http://localhost/").await.is_err());
        assert_eq!(recorder.log().len(), 1);
    }

    #[tokio::test]
    async fn shared_log_interleaves_two_recorders() {
        let log = TrafficLog::new();
        let client = PipelineBuilder::new()
            .with_message_handler(TrafficRecorderMessageHandler::with_log(log.clone()))
            .with_message_handler(TrafficRecorderMessageHandler::with_log(log.clone()))
            .build(MockTransport::always(StatusCode::OK));

        client.get("http://localhost/").await.unwrap();
        assert_eq!(log.len(), 2);
    }

    #[tokio::test]
    async fn visit_log_reflects_registration_order() {
        let visits = VisitLog::new();
        let client = PipelineBuilder::new()
            .with_message_handler(EventMessageHandler::new().with_visit_log(visits.clone()))
            .with_message_handler(
                TrafficRecorderMessageHandler::new().with_visit_log(visits.clone()),
            )
            .build(MockTransport::always(StatusCode::OK));

        client.get("http://localhost/").await.unwrap();
        client.get("http://localhost/").await.unwrap();

        assert_eq!(
            visits.entries(),
            vec!["event", "traffic-recorder", "event", "traffic-recorder"]
        );
    }
}
