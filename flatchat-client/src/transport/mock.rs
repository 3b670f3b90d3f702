/// Scripted transport for testing
///
/// Responses are registered per method and path suffix. Each route holds a
/// queue of replies: replies are consumed in order and the last one repeats.
/// Unmatched requests get a `404 {"message": "no route"}`. Every request is
/// recorded, so tests can assert on exactly which calls were (not) made.
///
/// # Example
///
/// ```
/// use flatchat_client::transport::{HttpRequest, MockTransport, Transport};
/// use reqwest::{Method, Url};
/// use serde_json::json;
///
/// # async fn example() {
/// let transport = MockTransport::new();
/// transport.respond(Method::POST, "/read-user", 200, json!({"HouseholdID": "h1"}));
///
/// let url = Url::parse("http://localhost/dev/read-user").unwrap();
/// let response = transport.send(HttpRequest::new(Method::POST, url)).await.unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(transport.request_count(), 1);
/// # }
/// ```

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use super::transport_trait::{HttpRequest, HttpResponse, Transport, TransportError, TransportResult};

#[derive(Debug, Clone)]
enum MockReply {
    Response(HttpResponse),
    Error(TransportError),
}

#[derive(Debug)]
struct Route {
    method: Method,
    path_suffix: String,
    replies: VecDeque<MockReply>,
}

impl Route {
    fn matches(&self, request: &HttpRequest) -> bool {
        self.method == request.method && request.url.path().ends_with(&self.path_suffix)
    }

    fn next_reply(&mut self) -> Option<MockReply> {
        if self.replies.len() > 1 {
            self.replies.pop_front()
        } else {
            self.replies.front().cloned()
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

/// Transport with canned replies and a request log
#[derive(Debug, Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
}

impl MockTransport {
    /// Creates a mock with no routes
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, method: Method, path_suffix: &str, reply: MockReply) {
        let mut state = self.lock();
        if let Some(route) = state
            .routes
            .iter_mut()
            .find(|r| r.method == method && r.path_suffix == path_suffix)
        {
            route.replies.push_back(reply);
            return;
        }
        state.routes.push(Route {
            method,
            path_suffix: path_suffix.to_string(),
            replies: VecDeque::from([reply]),
        });
    }

    /// Queues a JSON response for `method` on paths ending in `path_suffix`
    pub fn respond(&self, method: Method, path_suffix: &str, status: u16, body: JsonValue) {
        self.push(
            method,
            path_suffix,
            MockReply::Response(HttpResponse::json(status, &body)),
        );
    }

    /// Queues a raw-body response
    pub fn respond_raw(&self, method: Method, path_suffix: &str, status: u16, body: &str) {
        self.push(
            method,
            path_suffix,
            MockReply::Response(HttpResponse::new(status, body)),
        );
    }

    /// Queues a transport failure
    pub fn fail(&self, method: Method, path_suffix: &str, error: TransportError) {
        self.push(method, path_suffix, MockReply::Error(error));
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Number of requests with `method` on paths ending in `path_suffix`
    pub fn count(&self, method: Method, path_suffix: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.url.path().ends_with(path_suffix))
            .count()
    }

    /// Forgets recorded requests, keeping routes
    pub fn reset_requests(&self) {
        self.lock().requests.clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, request: HttpRequest) -> TransportResult<HttpResponse> {
        let reply = {
            let mut state = self.lock();
            let reply = state
                .routes
                .iter_mut()
                .find(|route| route.matches(&request))
                .and_then(Route::next_reply);
            state.requests.push(request);
            reply
        };

        match reply {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(error)) => Err(error),
            None => Ok(HttpResponse::new(404, r#"{"message":"no route"}"#)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;
    use serde_json::json;

    fn request(method: Method, path: &str) -> HttpRequest {
        HttpRequest::new(method, Url::parse(&format!("http://localhost{}", path)).unwrap())
    }

    #[tokio::test]
    async fn test_replies_in_order_then_repeat_last() {
        let mock = MockTransport::new();
        mock.respond(Method::GET, "/bills", 500, json!({"message": "down"}));
        mock.respond(Method::GET, "/bills", 200, json!({"bills": []}));

        let first = mock.send(request(Method::GET, "/dev/bills")).await.unwrap();
        let second = mock.send(request(Method::GET, "/dev/bills")).await.unwrap();
        let third = mock.send(request(Method::GET, "/dev/bills")).await.unwrap();

        assert_eq!(first.status, 500);
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(mock.count(Method::GET, "/bills"), 3);
    }

    #[tokio::test]
    async fn test_unmatched_and_failures() {
        let mock = MockTransport::new();
        mock.fail(
            Method::POST,
            "/read-user",
            TransportError::Connection("refused".to_string()),
        );

        let missing = mock.send(request(Method::GET, "/dev/tasks")).await.unwrap();
        assert_eq!(missing.status, 404);

        let err = mock
            .send(request(Method::POST, "/dev/read-user"))
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Connection("refused".to_string()));
        assert_eq!(mock.request_count(), 2);

        mock.reset_requests();
        assert_eq!(mock.request_count(), 0);
    }
}
