/// HTTP transport layer
///
/// The client never talks to `reqwest` directly. Identity lookups, household
/// directory calls and resource calls all build an [`HttpRequest`] and hand
/// it to a [`Transport`].
///
/// # Transports
///
/// - **Reqwest**: real HTTP, optional timeout
/// - **Mock**: scripted replies plus a request log, for tests

pub mod http;
pub mod mock;
pub mod transport_trait;

// Re-export main types
pub use http::ReqwestTransport;
pub use mock::MockTransport;
pub use transport_trait::{
    HttpRequest, HttpResponse, Transport, TransportError, TransportResult,
};
