//! Handler stamping a fixed header onto every request.

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};

use super::MessageHandler;
use crate::error::ClientError;
use crate::pipeline::{Next, Outcome};
use crate::request::{parse_header, HttpRequest};

/// Sets `name: value` on each request, replacing any existing values.
#[derive(Debug, Clone)]
pub struct HeaderMessageHandler {
    name: HeaderName,
    value: HeaderValue,
}

impl HeaderMessageHandler {
    /// Fails if `name` or `value` is not a valid header component.
    pub fn new(name: &str, value: &str) -> Result<Self, ClientError> {
        let (name, value) = parse_header(name, value)?;
        Ok(Self { name, value })
    }
}

#[async_trait]
impl MessageHandler for HeaderMessageHandler {
    async fn handle(&self, mut req: HttpRequest, next: Next<'_>) -> Outcome {
        req.headers.insert(self.name.clone(), self.value.clone());
        next.run(req).await
    }

    fn name(&self) -> &str {
        "header"
    }
}
