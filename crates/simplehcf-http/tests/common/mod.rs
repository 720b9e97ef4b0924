//! Mock endpoints shared by the integration tests.
//!
//! `/hello/world` answers 408 exactly once and 200 afterwards, `/timeout`
//! always answers 408 and `/slow` answers 200 after three seconds.

#![allow(dead_code)]

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const ENDPOINT: &str = "/hello/world";
pub const ENDPOINT_TIMEOUT: &str = "/timeout";
pub const ENDPOINT_SLOW: &str = "/slow";

/// Start a mock server with every endpoint mounted.
pub async fn mock_server() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(408))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/plain")
                .set_body_string("Hello world!"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_TIMEOUT))
        .respond_with(ResponseTemplate::new(408))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_SLOW))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    server
}

/// Every request the server has received so far.
pub async fn received(server: &MockServer) -> Vec<Request> {
    server.received_requests().await.unwrap_or_default()
}

/// Value of `name` on a received request, if present and valid UTF-8.
pub fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers.get(name).and_then(|v| v.to_str().ok())
}
