//! Structured logging setup.
//!
//! The crate itself only emits `tracing` events (retry scheduling, limiter
//! polling, retry exhaustion); this module is the optional subscriber setup
//! for applications that do not configure their own.

mod logging;

pub use logging::{LogFormat, LogLevel, LoggingConfig};
