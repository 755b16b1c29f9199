//! Mock implementations for testing.
//!
//! Provides a scripted transport so client behavior can be exercised without
//! a network: queue up responses and errors, then assert on the number of
//! calls made.

use crate::cancel::CancelSignal;
use crate::errors::{ResilientError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Scripted mock transport: replays queued results in order.
pub struct MockHttpTransport {
    script: Mutex<VecDeque<Result<HttpResponse>>>,
    calls: AtomicUsize,
}

impl MockHttpTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a response with the given status and an empty body.
    pub fn push_status(&self, status: StatusCode) {
        self.push_response(HttpResponse {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        });
    }

    /// Queue a full response.
    pub fn push_response(&self, response: HttpResponse) {
        self.script.lock().push_back(Ok(response));
    }

    /// Queue a transport-level failure.
    pub fn push_error(&self, error: ResilientError) {
        self.script.lock().push_back(Err(error));
    }

    /// Number of send calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, cancel: &CancelSignal, _request: HttpRequest) -> Result<HttpResponse> {
        cancel.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);

        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(ResilientError::Internal {
                    message: "mock transport script exhausted".to_string(),
                })
            })
    }
}
