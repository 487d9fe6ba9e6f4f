use std::time::Duration;

/// What to do with one attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Success,
    WaitAndRetry(Duration),
    RetryImmediate,
    FailFast,
}

impl Action {
    /// Sleep before the next attempt, `None` when the loop must stop here.
    pub fn delay(&self) -> Option<Duration> {
        match self {
            Action::WaitAndRetry(d) => Some(*d),
            Action::RetryImmediate => Some(Duration::ZERO),
            Action::Success | Action::FailFast => None,
        }
    }
}

/// Status-code table plus the bounds of one logical call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per logical call, the first one included.
    pub max_attempts: u32,
    /// Total time one call may spend sleeping between attempts.
    pub max_total_wait: Duration,
    /// 429 wait when the server sent no usable `Retry-After`.
    pub rate_limit_fallback: Duration,
    /// Wait after 502/503 or a network failure.
    pub transient_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            max_total_wait: Duration::from_secs(60),
            rate_limit_fallback: Duration::from_secs(10),
            transient_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn classify(&self, status: u16, retry_after: Option<&str>) -> Action {
        match status {
            200..=299 => Action::Success,
            429 => Action::WaitAndRetry(
                retry_after
                    .and_then(parse_retry_after)
                    .unwrap_or(self.rate_limit_fallback),
            ),
            502 | 503 => Action::WaitAndRetry(self.transient_delay),
            // The attempt already burned its whole timeout upstream.
            504 => Action::RetryImmediate,
            _ => Action::FailFast,
        }
    }

    pub fn on_network_error(&self) -> Action {
        Action::WaitAndRetry(self.transient_delay)
    }
}

/// `Retry-After` in delta-seconds form.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Bookkeeping for a single logical call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    pub attempts: u32,
    pub waited: Duration,
    pub last_status: Option<u16>,
}

impl RetryState {
    /// Whether another attempt fits in the policy after sleeping `delay`.
    pub fn can_retry(&self, policy: &RetryPolicy, delay: Duration) -> bool {
        self.attempts < policy.max_attempts
            && self
                .waited
                .checked_add(delay)
                .is_some_and(|total| total <= policy.max_total_wait)
    }

    pub fn record_wait(&mut self, delay: Duration) {
        self.waited = self.waited.saturating_add(delay);
    }
}
