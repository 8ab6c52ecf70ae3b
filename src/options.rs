use std::time::Duration;

/// Per-request timeout. The API hangs for long stretches when overloaded;
/// anything past a minute counts as a transport failure.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Configures how the request executor retries failed calls.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Total attempt budget, counting the first try. Must be at least 1.
    pub max_attempts: u32,
    /// Base retry wait in milliseconds. Server-error retries grow from this
    /// exponentially; other transient retries wait exactly this long.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            base_backoff_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying a server error, for the given 1-based attempt:
    /// `base * 1.5^(attempt-1)`. Growth is uncapped; the attempt budget is
    /// the only bound.
    pub fn server_error_backoff(&self, attempt: u32) -> Duration {
        let factor = 1.5f64.powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis((self.base_backoff_ms as f64 * factor) as u64)
    }

    /// Fixed wait before retrying a non-server transient failure.
    pub fn transient_backoff(&self) -> Duration {
        Duration::from_millis(self.base_backoff_ms)
    }
}
