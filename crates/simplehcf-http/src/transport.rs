//! HTTP transport backed by `reqwest`.
//!
//! Performs exactly one round trip per call. Non-2xx statuses come back as
//! ordinary responses so that policies can inspect them; only connection
//! level failures become [`ClientError::Transport`].

use async_trait::async_trait;
use std::time::Duration;

use simplehcf_core::config::TransportConfig;
use simplehcf_core::error::ClientError;
use simplehcf_core::request::{HttpRequest, HttpResponse};
use simplehcf_core::transport::HttpTransport;

/// `HttpTransport` over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with its own connection pool.
    pub fn new(config: &TransportConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.connect_timeout_ms {
            builder = builder.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.as_str());
        }
        if let Some(max_idle) = config.pool_max_idle_per_host {
            builder = builder.pool_max_idle_per_host(max_idle);
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Other(format!("failed to build reqwest client: {e}")))?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest::Client`, sharing its pool.
    pub fn from_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ClientError {
    if e.is_builder() {
        ClientError::InvalidRequest(e.to_string())
    } else {
        ClientError::Transport(e.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let HttpRequest {
            method,
            uri,
            headers,
            body,
        } = req;

        let mut request = self.http.request(method, uri.to_string()).headers(headers);
        if !body.is_empty() {
            request = request.body(body);
        }

        let resp = request.send().await.map_err(map_reqwest_error)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.bytes().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    fn name(&self) -> &str {
        "reqwest"
    }
}
