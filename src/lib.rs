//! # Resilient HTTP Client
//!
//! Production-ready resilience layer for outbound HTTP calls against
//! rate-limited upstreams.
//!
//! ## Features
//!
//! - Multi-window fixed-window rate limiting (second / minute / hour)
//! - Bounded retry with deterministic exponential backoff
//! - Status-code retry policy, transparent to the caller
//! - Cancellation-aware blocking: explicit cancel and deadlines abort any
//!   in-flight wait immediately
//! - Pluggable transport with a reqwest default
//! - Structured logging via `tracing`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resilient_http::{CancelSignal, ClientConfig, HttpRequest, ResilientClient};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .retry_on(StatusCode::TOO_MANY_REQUESTS)
//!         .retry_on(StatusCode::INTERNAL_SERVER_ERROR)
//!         .retry_on(StatusCode::BAD_GATEWAY)
//!         .retry_on(StatusCode::SERVICE_UNAVAILABLE)
//!         .build();
//!
//!     let client = ResilientClient::new(config)?;
//!
//!     let request = HttpRequest::get("https://api.example.com/data".parse()?);
//!     let response = client.execute(&CancelSignal::new(), request).await?;
//!     println!("status: {}", response.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - `client` - Resilient client composing rate limiting, retry, and transport
//! - `resilience` - The rate limiter and retryer primitives
//! - `transport` - HTTP transport trait and reqwest implementation
//! - `cancel` - Cancellation signal (explicit cancel + deadline)
//! - `errors` - Error types and taxonomy
//! - `observability` - Logging setup
//! - `mocks` - Mock transport for testing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cancel;
pub mod client;
pub mod errors;
pub mod observability;
pub mod resilience;
pub mod transport;

// Development/testing modules
#[cfg(test)]
pub mod mocks;

// Re-exports for convenience
pub use cancel::CancelSignal;
pub use client::{ClientConfig, ClientConfigBuilder, ResilientClient};
pub use errors::{ResilientError, Result};
pub use observability::{LogFormat, LogLevel, LoggingConfig};
pub use resilience::{AttemptOutcome, RateLimitConfig, RateLimiter, RetryConfig, Retryer};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

/// The default per-request timeout for the built-in transport, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
