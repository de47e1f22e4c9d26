use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

// All unauthenticated traffic shares this bucket
pub const GLOBAL_IDENTITY: &str = "global_unauthenticated_user";

pub const DEFAULT_LIMIT: usize = 3;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Rejection from [`SlidingWindowLimiter::check`], carrying how long the
/// caller should wait before the window admits another request.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Too many requests. Please try again later. Retry after {} seconds.", ceil_secs(.retry_after))]
pub struct RateLimitExceeded {
    pub retry_after: Duration,
}

impl RateLimitExceeded {
    // Whole seconds, rounded up so a client never retries too early
    pub fn retry_after_secs(&self) -> u64 {
        ceil_secs(&self.retry_after)
    }
}

fn ceil_secs(d: &Duration) -> u64 {
    d.as_secs_f64().ceil() as u64
}

/// Sliding-window limiter keyed by caller identity.
///
/// Each identity owns the timestamps (time since the Unix epoch) of its
/// accepted requests. A check purges entries that fell out of the trailing
/// window, then either rejects or records the new request. The DashMap entry
/// guard is held for the whole read-modify-write, so concurrent checks on the
/// same identity never lose an update.
pub struct SlidingWindowLimiter {
    windows: DashMap<String, VecDeque<Duration>>,
    limit: usize,       // max requests allowed per window
    window: Duration,   // length of the trailing window
}

impl SlidingWindowLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // Check against the wall clock
    pub fn check(&self, identity: &str) -> Result<(), RateLimitExceeded> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        self.check_at(identity, now)
    }

    /// Same as [`check`](Self::check) with an explicit "now", expressed as
    /// time since the Unix epoch.
    pub fn check_at(&self, identity: &str, now: Duration) -> Result<(), RateLimitExceeded> {
        let mut timestamps = self.windows.entry(identity.to_string()).or_default();

        // keep only t > now - window
        let window = self.window;
        timestamps.retain(|&t| now.saturating_sub(t) < window);

        if timestamps.len() >= self.limit {
            let oldest = timestamps.iter().min().copied().unwrap_or(now);
            let elapsed = now.saturating_sub(oldest);
            return Err(RateLimitExceeded {
                retry_after: window.saturating_sub(elapsed),
            });
        }

        timestamps.push_back(now);
        Ok(())
    }

    // Number of retained timestamps for an identity, as of the last check
    pub fn retained(&self, identity: &str) -> usize {
        self.windows.get(identity).map(|w| w.len()).unwrap_or(0)
    }
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}
