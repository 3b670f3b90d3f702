/// Core Transport trait and request/response types
///
/// Every backend call the client makes goes through a [`Transport`]. The
/// production implementation wraps `reqwest`; tests swap in a scripted or
/// stateful fake without touching the callers.
///
/// # Transport Contract
///
/// A transport must:
/// 1. Send the request exactly once (no retries)
/// 2. Attach `Authorization: Bearer <token>` when `bearer` is set
/// 3. Serialize `body` as JSON when present
/// 4. Return any HTTP status as a response; only a request that produced no
///    response at all is an error
///
/// # Example
///
/// ```no_run
/// use async_trait::async_trait;
/// use flatchat_client::transport::{HttpRequest, HttpResponse, Transport, TransportResult};
///
/// struct AlwaysEmpty;
///
/// #[async_trait]
/// impl Transport for AlwaysEmpty {
///     fn name(&self) -> &str {
///         "always_empty"
///     }
///
///     async fn send(&self, _request: HttpRequest) -> TransportResult<HttpResponse> {
///         Ok(HttpResponse::new(200, "{}"))
///     }
/// }
/// ```

use async_trait::async_trait;
use reqwest::{Method, Url};
use serde_json::Value as JsonValue;
use std::fmt;

/// Transport error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection could not be established or was dropped
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Caller-configured timeout elapsed
    #[error("Request timed out")]
    Timeout,

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Transport result type alias
pub type TransportResult<T> = Result<T, TransportError>;

/// Outgoing request
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Access token sent as a bearer credential
    pub bearer: Option<String>,
    pub body: Option<JsonValue>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        HttpRequest {
            method,
            url,
            bearer: None,
            body: None,
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn delete(url: Url) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Value of a query parameter, if present
    pub fn query_param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body", &self.body)
            .finish()
    }
}

/// Response as received; any status is a response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        HttpResponse {
            status,
            body: body.into(),
        }
    }

    /// Response with a JSON body
    pub fn json(status: u16, body: &JsonValue) -> Self {
        Self::new(status, body.to_string())
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends HTTP requests on behalf of the client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transport name for logs
    fn name(&self) -> &str;

    /// Sends `request` once and returns whatever response arrives
    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse>;
}
