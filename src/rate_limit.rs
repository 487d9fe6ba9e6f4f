use governor::{
    clock::{Clock, DefaultClock},
    DefaultDirectRateLimiter, Quota,
};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Development keys allow 20 requests/second and 100 requests/2 minutes:
/// a burst of 20 refilled at one request every 1.2s stays under both.
pub const DEFAULT_BURST: u32 = 20;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub burst: NonZeroU32,
    pub interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        RateLimitConfig {
            burst: NonZeroU32::new(DEFAULT_BURST).unwrap_or(NonZeroU32::MIN),
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl RateLimitConfig {
    fn quota(&self) -> Quota {
        Quota::with_period(self.interval)
            .unwrap_or_else(|| Quota::per_second(self.burst))
            .allow_burst(self.burst)
    }
}

struct Inner {
    limiter: DefaultDirectRateLimiter,
    clock: DefaultClock,
    admitted: AtomicU64,
    throttled: AtomicU64,
}

/// Process-wide request budget shared by every clone.
///
/// Each attempt (retries included) must pass through [`RateGate::until_ready`],
/// so callers running on several threads cannot collectively exceed the quota.
#[derive(Clone)]
pub struct RateGate {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RateGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateGate")
            .field("admitted", &self.admitted())
            .field("throttled", &self.throttled())
            .finish()
    }
}

impl RateGate {
    pub fn new(config: RateLimitConfig) -> Self {
        RateGate {
            inner: Arc::new(Inner {
                limiter: DefaultDirectRateLimiter::direct(config.quota()),
                clock: DefaultClock::default(),
                admitted: AtomicU64::new(0),
                throttled: AtomicU64::new(0),
            }),
        }
    }

    /// Block until the shared budget admits one more request.
    pub fn until_ready(&self) {
        self.until_ready_within(None);
    }

    /// Like [`RateGate::until_ready`], but gives up without taking a slot when
    /// the gate would not open within `limit`. Returns whether a slot was taken.
    pub fn until_ready_within(&self, limit: Option<Duration>) -> bool {
        let start = Instant::now();
        loop {
            let not_until = match self.inner.limiter.check() {
                Ok(()) => {
                    self.inner.admitted.fetch_add(1, Ordering::Relaxed);
                    return true;
                }
                Err(not_until) => not_until,
            };

            let wait = not_until.wait_time_from(self.inner.clock.now());
            if let Some(limit) = limit {
                if start.elapsed().saturating_add(wait) > limit {
                    tracing::debug!(wait_ms = wait.as_millis() as u64, "rate gate opens too late");
                    return false;
                }
            }

            self.inner.throttled.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate gate closed, waiting");
            thread::sleep(wait);
        }
    }

    /// Requests let through so far.
    pub fn admitted(&self) -> u64 {
        self.inner.admitted.load(Ordering::Relaxed)
    }

    /// Times a caller had to wait for the budget to refill.
    pub fn throttled(&self) -> u64 {
        self.inner.throttled.load(Ordering::Relaxed)
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
