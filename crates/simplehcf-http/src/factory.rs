//! `HttpClientFactory`: configure once, hand out clients sharing one pool.

use std::sync::Arc;

use simplehcf_core::config::{ClientConfig, TransportConfig};
use simplehcf_core::error::ClientError;
use simplehcf_core::handler::MessageHandler;
use simplehcf_core::pipeline::{HttpClient, PipelineBuilder};
use simplehcf_core::policy::Policy;
use simplehcf_core::transport::HttpTransport;

use crate::transport::ReqwestTransport;

/// Collects policies, message handlers and transport settings.
#[derive(Debug, Clone, Default)]
pub struct HttpClientFactoryBuilder {
    pipeline: PipelineBuilder,
    transport: TransportConfig,
}

impl HttpClientFactoryBuilder {
    pub fn create() -> Self {
        Self::default()
    }

    /// Start from a declarative config: its policies (retry, circuit
    /// breaker, timeout, outermost first) and transport settings.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            pipeline: config.apply_policies(PipelineBuilder::new()),
            transport: config.transport.clone(),
        }
    }

    /// Append a policy. Earlier policies wrap later ones.
    pub fn with_policy(mut self, policy: impl Policy) -> Self {
        self.pipeline = self.pipeline.with_policy(policy);
        self
    }

    /// Append a message handler. Handlers see requests in registration order.
    pub fn with_message_handler(mut self, handler: impl MessageHandler) -> Self {
        self.pipeline = self.pipeline.with_message_handler(handler);
        self
    }

    pub fn with_transport_config(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Build the factory over a `reqwest` transport.
    pub fn build(self) -> Result<HttpClientFactory, ClientError> {
        let transport = ReqwestTransport::new(&self.transport)?;
        Ok(self.build_with_transport(transport))
    }

    /// Build the factory over any transport; transport settings are ignored.
    pub fn build_with_transport(self, transport: impl HttpTransport) -> HttpClientFactory {
        let transport: Arc<dyn HttpTransport> = Arc::new(transport);
        tracing::debug!(
            policies = self.pipeline.policy_count(),
            handlers = self.pipeline.handler_count(),
            "http client factory built"
        );
        HttpClientFactory {
            client: self.pipeline.build_shared(transport),
        }
    }
}

/// Produces clients bound to one immutable pipeline and connection pool.
#[derive(Debug, Clone)]
pub struct HttpClientFactory {
    client: HttpClient,
}

impl HttpClientFactory {
    pub fn create_client(&self) -> HttpClient {
        self.client.clone()
    }
}
