/// reqwest-backed transport
///
/// No timeout is applied unless one is configured; a hung request then keeps
/// its caller waiting, which is the documented behavior of the coordinator.

use async_trait::async_trait;
use std::time::Duration;

use super::transport_trait::{HttpRequest, HttpResponse, Transport, TransportError, TransportResult};

/// HTTP transport over a shared `reqwest::Client`
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport, optionally with a per-request timeout
    pub fn new(timeout: Option<Duration>) -> TransportResult<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("flatchat/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    fn name(&self) -> &str {
        "reqwest"
    }

    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let HttpRequest {
            method,
            url,
            bearer,
            body,
        } = request;

        tracing::debug!(method = %method, path = url.path(), "Sending request");

        let mut builder = self.client.request(method, url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Connection(err.to_string())
    }
}
