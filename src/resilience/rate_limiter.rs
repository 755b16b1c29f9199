use crate::cancel::CancelSignal;
use crate::errors::Result;
use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::trace;

/// How long a blocked caller sleeps between admission checks.
///
/// Bounds worst-case admission latency once capacity frees up; the fixed
/// windows make precision timers unnecessary.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Configuration for rate limiting.
///
/// A ceiling of `0` makes that window permanently unsatisfiable, so
/// [`RateLimiter::wait`] blocks until cancellation. Useful in tests, not in
/// normal configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests admitted per second window
    pub requests_per_second: u32,
    /// Maximum requests admitted per minute window
    pub requests_per_minute: u32,
    /// Maximum requests admitted per hour window
    pub requests_per_hour: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 50,
            requests_per_minute: 500,
            requests_per_hour: 2000,
        }
    }
}

/// Multi-window fixed-window rate limiter.
///
/// Tracks admissions against three independent windows (second, minute,
/// hour). A request is admitted only when all three have spare capacity, and
/// admission consumes one unit from each. Windows reset lazily the first time
/// they are observed past their boundary; there is no background timer.
///
/// Fixed windows are intentionally bursty at boundaries; the upstream quotas
/// this models are enforced at the same granularity.
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given ceilings.
    pub fn new(config: RateLimitConfig) -> Self {
        let now = Instant::now();
        Self {
            config,
            windows: Mutex::new(Windows {
                second: Window::new(now, Duration::from_secs(1)),
                minute: Window::new(now, Duration::from_secs(60)),
                hour: Window::new(now, Duration::from_secs(3600)),
            }),
        }
    }

    /// Block until one unit of capacity is admitted in all three windows, or
    /// the cancellation signal fires.
    ///
    /// Concurrent callers are serialized through a single lock, so the
    /// configured ceilings are never over-admitted. No fairness guarantee
    /// exists between waiters when capacity frees up.
    pub async fn wait(&self, cancel: &CancelSignal) -> Result<()> {
        loop {
            cancel.check()?;

            if self.try_acquire() {
                return Ok(());
            }

            trace!("rate limiter at capacity, polling");
            tokio::select! {
                err = cancel.cancelled() => return Err(err),
                _ = sleep(POLL_INTERVAL) => {}
            }
        }
    }

    /// Roll expired windows, then test and consume capacity in one critical
    /// section. Returns whether the caller was admitted.
    fn try_acquire(&self) -> bool {
        let mut windows = self.windows.lock();
        let now = Instant::now();

        windows.second.roll(now);
        windows.minute.roll(now);
        windows.hour.roll(now);

        let admitted = windows.second.count < self.config.requests_per_second
            && windows.minute.count < self.config.requests_per_minute
            && windows.hour.count < self.config.requests_per_hour;

        if admitted {
            windows.second.count += 1;
            windows.minute.count += 1;
            windows.hour.count += 1;
        }

        admitted
    }

    #[cfg(test)]
    pub(crate) fn counts(&self) -> (u32, u32, u32) {
        let windows = self.windows.lock();
        (windows.second.count, windows.minute.count, windows.hour.count)
    }
}

struct Windows {
    second: Window,
    minute: Window,
    hour: Window,
}

/// One fixed window: admissions so far and the instant the window rolls over.
struct Window {
    count: u32,
    reset_at: Instant,
    period: Duration,
}

impl Window {
    fn new(now: Instant, period: Duration) -> Self {
        Self {
            count: 0,
            reset_at: now + period,
            period,
        }
    }

    fn roll(&mut self, now: Instant) {
        if now > self.reset_at {
            self.count = 0;
            self.reset_at = now + self.period;
        }
    }
}
