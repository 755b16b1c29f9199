//! HTTP transport abstraction.
//!
//! The resilience layer is transparent to its caller: requests and responses
//! pass through unchanged, and the transport is the only component that
//! touches the network. Implementations must be safe for concurrent use.

mod http_transport;

use crate::cancel::CancelSignal;
use crate::errors::Result;
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use url::Url;

pub use http_transport::ReqwestTransport;

/// Transport capability: perform one network exchange.
///
/// A transport-level failure (no response produced) surfaces as
/// [`crate::ResilientError::Network`]; any received response, whatever its
/// status, is returned as `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request, racing the in-flight exchange against the
    /// cancellation signal.
    async fn send(&self, cancel: &CancelSignal, request: HttpRequest) -> Result<HttpResponse>;
}

/// An HTTP request, cloneable so the client can re-issue it per retry attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Request method
    pub method: Method,
    /// Request URL
    pub url: Url,
    /// Request headers
    pub headers: HeaderMap,
    /// Optional request body
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Convenience constructor for a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Set the request body.
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }
}

/// An HTTP response with its body read eagerly.
///
/// Dropping the response releases the body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}
