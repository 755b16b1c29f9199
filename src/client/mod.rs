//! Resilient client: rate limiting and retry composed around a transport.

use crate::cancel::CancelSignal;
use crate::errors::{ResilientError, Result};
use crate::resilience::{AttemptOutcome, RateLimitConfig, RateLimiter, RetryConfig, Retryer};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::DEFAULT_TIMEOUT_SECS;
use http::StatusCode;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Configuration for a [`ResilientClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Window ceilings for the rate limiter
    pub rate_limit: RateLimitConfig,
    /// Retry budget and backoff shape
    pub retry: RetryConfig,
    /// Status codes that trigger a retry; empty means "never retry on status"
    pub retry_on_status: HashSet<StatusCode>,
    /// Per-request timeout for the default transport
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            retry: RetryConfig::default(),
            retry_on_status: HashSet::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    rate_limit: Option<RateLimitConfig>,
    retry: Option<RetryConfig>,
    retry_on_status: HashSet<StatusCode>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Sets the rate limiter ceilings.
    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Sets the retry budget and backoff shape.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Adds a status code that triggers a retry.
    pub fn retry_on(mut self, status: StatusCode) -> Self {
        self.retry_on_status.insert(status);
        self
    }

    /// Sets the full set of retryable status codes.
    pub fn retry_on_status(mut self, statuses: impl IntoIterator<Item = StatusCode>) -> Self {
        self.retry_on_status = statuses.into_iter().collect();
        self
    }

    /// Sets the default transport's per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            rate_limit: self.rate_limit.unwrap_or_default(),
            retry: self.retry.unwrap_or_default(),
            retry_on_status: self.retry_on_status,
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

/// HTTP client wrapping a transport with rate limiting and bounded retry.
///
/// Safe to share across tasks: concurrent calls serialize through the rate
/// limiter's windows and otherwise proceed independently.
pub struct ResilientClient {
    limiter: RateLimiter,
    retryer: Retryer,
    retry_on_status: HashSet<StatusCode>,
    transport: Arc<dyn HttpTransport>,
}

impl ResilientClient {
    /// Create a client with the default reqwest transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport =
            Arc::new(ReqwestTransport::new(config.timeout)?) as Arc<dyn HttpTransport>;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client over a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            limiter: RateLimiter::new(config.rate_limit),
            retryer: Retryer::new(config.retry),
            retry_on_status: config.retry_on_status,
            transport,
        }
    }

    /// Execute one logical request, attempt by attempt.
    ///
    /// Each attempt acquires rate-limiter admission, performs exactly one
    /// transport call, and classifies the outcome: admission failure is the
    /// cancellation error and terminal; a transport failure is always
    /// transient; a response whose status is in the retry set is discarded and
    /// retried as policy. If retries exhaust on a retryable status, the last
    /// response is returned as `Ok` and the caller inspects the status itself.
    pub async fn execute(
        &self,
        cancel: &CancelSignal,
        request: HttpRequest,
    ) -> Result<HttpResponse> {
        let latest: Mutex<Option<HttpResponse>> = Mutex::new(None);

        let limiter = &self.limiter;
        let transport = &self.transport;
        let retry_on_status = &self.retry_on_status;
        let latest_slot = &latest;
        let request_template = &request;

        self.retryer
            .execute(cancel, move || {
                let request = request_template.clone();
                async move {
                    if let Err(err) = limiter.wait(cancel).await {
                        return AttemptOutcome::Done(Some(err));
                    }

                    let response = match transport.send(cancel, request).await {
                        Ok(response) => response,
                        // No response was produced; network failures are
                        // always transient.
                        Err(err) => return AttemptOutcome::Retry(Some(err)),
                    };

                    let status = response.status;
                    let retry = retry_on_status.contains(&status);
                    // Replacing the slot drops the previous attempt's
                    // response, releasing its body before the next attempt.
                    latest_slot.lock().replace(response);

                    if retry {
                        debug!(%status, "status in retry set, retrying");
                        AttemptOutcome::Retry(None)
                    } else {
                        AttemptOutcome::Done(None)
                    }
                }
            })
            .await?;

        latest.into_inner().ok_or_else(|| ResilientError::Internal {
            message: "retry loop finished without a response".to_string(),
        })
    }
}
