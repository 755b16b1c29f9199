use crate::cancel::CancelSignal;
use crate::errors::{ResilientError, Result};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Reqwest-based transport with a fixed per-request timeout.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a new transport. `timeout` bounds each individual exchange; the
    /// retry and rate-limit layers add their own waiting on top.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResilientError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, cancel: &CancelSignal, request: HttpRequest) -> Result<HttpResponse> {
        cancel.check()?;

        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        };

        tokio::select! {
            err = cancel.cancelled() => Err(err),
            result = exchange => result,
        }
    }
}
