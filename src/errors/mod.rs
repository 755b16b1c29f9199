//! Error types for the resilient HTTP client.

mod error;

pub use error::{ResilientError, Result};
