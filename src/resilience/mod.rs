//! Resilience primitives: multi-window rate limiting and bounded retry.
//!
//! These two components are independent; [`crate::client::ResilientClient`]
//! composes them around a transport.

mod rate_limiter;
mod retry;


pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use retry::{AttemptOutcome, RetryConfig, Retryer};
