//! Cancellation signal shared by every blocking point in the crate.
//!
//! A [`CancelSignal`] carries an explicit cancellation token and an optional
//! deadline. Rate-limiter polls, retry backoff sleeps, and in-flight transport
//! sends all race against it, so a fired signal aborts the wait immediately
//! rather than at the next poll boundary.

use crate::errors::{ResilientError, Result};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Cooperative cancellation signal with an optional deadline.
///
/// Cloning is cheap; clones observe the same underlying token and deadline,
/// so a signal can be handed to concurrent calls and cancelled once.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// Create a signal that only fires when [`cancel`](Self::cancel) is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a signal that fires once `timeout` has elapsed from now, or
    /// earlier if cancelled explicitly.
    pub fn with_deadline(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    /// Create a signal driven by an externally owned token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Trigger the signal explicitly.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking probe. Returns the cancellation error if the signal has
    /// already fired, `Ok(())` otherwise.
    pub fn check(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(ResilientError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(ResilientError::DeadlineExceeded);
            }
        }
        Ok(())
    }

    /// Resolves once the signal fires, yielding the corresponding error.
    ///
    /// Intended for `tokio::select!` races against sleeps and sends.
    pub async fn cancelled(&self) -> ResilientError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => ResilientError::Cancelled,
                    _ = sleep_until(deadline) => ResilientError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ResilientError::Cancelled
            }
        }
    }
}
