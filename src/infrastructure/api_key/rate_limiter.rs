//! Rate limiter implementation
//!
//! Provides sliding window rate limiting for API keys. State lives in the
//! process, so each instance of the gateway enforces limits independently;
//! a shared counter store can be plugged in behind [`RateLimiter`].

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::Serialize;

/// Default window length in seconds
pub const DEFAULT_WINDOW_SECS: u64 = 3600;

/// Quota metadata returned to clients
///
/// `reset_at` is `now + window`, an approximation rather than the moment the
/// oldest counted request leaves the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitHeaders {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp in seconds
    pub reset_at: i64,
}

/// Admission control keyed by API key
pub trait RateLimiter: Send + Sync + std::fmt::Debug {
    /// Admit and record a request, or reject it without recording
    fn allow(&self, key: &str, limit: u32, window_secs: u64, now: DateTime<Utc>) -> bool;

    /// Current quota for a key
    fn headers(&self, key: &str, limit: u32, window_secs: u64, now: DateTime<Utc>)
        -> RateLimitHeaders;
}

/// In-memory sliding window counter
///
/// Each key owns a queue of admission timestamps. Checks for the same key are
/// serialized by the map's shard lock; different keys proceed independently.
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    windows: DashMap<String, VecDeque<DateTime<Utc>>>,
    sweep_interval_secs: i64,
    last_sweep: AtomicI64,
}

impl SlidingWindowRateLimiter {
    pub fn new() -> Self {
        Self {
            windows: DashMap::new(),
            sweep_interval_secs: 300,
            last_sweep: AtomicI64::new(i64::MIN),
        }
    }

    /// Set how often idle keys are swept
    pub fn with_sweep_interval(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs as i64;
        self
    }

    /// Forget all state for a key
    pub fn reset(&self, key: &str) {
        self.windows.remove(key);
    }

    /// Number of keys currently holding timestamps
    pub fn tracked_keys(&self) -> usize {
        self.windows.len()
    }

    fn maybe_sweep(&self, window_secs: u64, now: DateTime<Utc>) {
        let now_secs = now.timestamp();
        let last = self.last_sweep.load(Ordering::Acquire);

        if last != i64::MIN && now_secs.saturating_sub(last) < self.sweep_interval_secs {
            return;
        }

        // Only one caller sweeps per interval
        if self
            .last_sweep
            .compare_exchange(last, now_secs, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let cutoff = window_start(now, window_secs);
        self.windows.retain(|_, timestamps| {
            prune(timestamps, cutoff);
            !timestamps.is_empty()
        });
    }
}

impl Default for SlidingWindowRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter for SlidingWindowRateLimiter {
    fn allow(&self, key: &str, limit: u32, window_secs: u64, now: DateTime<Utc>) -> bool {
        self.maybe_sweep(window_secs, now);

        let cutoff = window_start(now, window_secs);
        let admitted = {
            let mut timestamps = self.windows.entry(key.to_string()).or_default();
            prune(&mut timestamps, cutoff);

            if timestamps.len() >= limit as usize {
                false
            } else {
                timestamps.push_back(now);
                true
            }
        };

        if !admitted {
            self.windows.remove_if(key, |_, timestamps| timestamps.is_empty());
        }

        admitted
    }

    fn headers(
        &self,
        key: &str,
        limit: u32,
        window_secs: u64,
        now: DateTime<Utc>,
    ) -> RateLimitHeaders {
        let cutoff = window_start(now, window_secs);
        let used = self
            .windows
            .get(key)
            .map(|timestamps| timestamps.iter().filter(|t| **t > cutoff).count())
            .unwrap_or(0);

        RateLimitHeaders {
            limit,
            remaining: limit.saturating_sub(u32::try_from(used).unwrap_or(u32::MAX)),
            reset_at: (now + window(window_secs)).timestamp(),
        }
    }
}

fn window(window_secs: u64) -> Duration {
    Duration::seconds(window_secs.min(u64::from(u32::MAX)) as i64)
}

fn window_start(now: DateTime<Utc>, window_secs: u64) -> DateTime<Utc> {
    now - window(window_secs)
}

/// Drop timestamps at or before the window start
///
/// Callers supply `now`, so concurrent admissions may land slightly out of order.
fn prune(timestamps: &mut VecDeque<DateTime<Utc>>, cutoff: DateTime<Utc>) {
    timestamps.retain(|t| *t > cutoff);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_sliding_window() {
        let limiter = SlidingWindowRateLimiter::new();

        assert!(limiter.allow("key1", 3, 60, at(0)));
        assert!(limiter.allow("key1", 3, 60, at(0)));
        assert!(limiter.allow("key1", 3, 60, at(0)));
        assert!(!limiter.allow("key1", 3, 60, at(10)));
        assert!(limiter.allow("key1", 3, 60, at(61)));
    }

    #[test]
    fn test_rejection_is_not_recorded() {
        let limiter = SlidingWindowRateLimiter::new();

        assert!(limiter.allow("key1", 1, 60, at(0)));
        for t in 1..30 {
            assert!(!limiter.allow("key1", 1, 60, at(t)));
        }

        // Only the admitted request counts, so the key recovers once it ages out
        assert!(limiter.allow("key1", 1, 60, at(61)));
    }

    #[test]
    fn test_different_keys() {
        let limiter = SlidingWindowRateLimiter::new();

        assert!(limiter.allow("key1", 1, 60, at(0)));
        assert!(limiter.allow("key2", 1, 60, at(0)));
        assert!(!limiter.allow("key1", 1, 60, at(1)));
    }

    #[test]
    fn test_headers() {
        let limiter = SlidingWindowRateLimiter::new();

        let fresh = limiter.headers("key1", 10, 3600, at(0));
        assert_eq!(fresh.remaining, 10);
        assert_eq!(fresh.limit, 10);

        limiter.allow("key1", 10, 3600, at(0));
        limiter.allow("key1", 10, 3600, at(5));

        let headers = limiter.headers("key1", 10, 3600, at(5));
        assert_eq!(headers.remaining, 8);
        assert_eq!(headers.reset_at, at(5).timestamp() + 3600);
    }

    #[test]
    fn test_headers_never_negative() {
        let limiter = SlidingWindowRateLimiter::new();

        for _ in 0..5 {
            limiter.allow("key1", 5, 60, at(0));
        }

        // A lowered limit must not underflow
        assert_eq!(limiter.headers("key1", 2, 60, at(1)).remaining, 0);
    }

    #[test]
    fn test_zero_limit_rejects_without_tracking() {
        let limiter = SlidingWindowRateLimiter::new();

        assert!(!limiter.allow("key1", 0, 60, at(0)));
        assert_eq!(limiter.tracked_keys(), 0);
    }

    #[test]
    fn test_reset() {
        let limiter = SlidingWindowRateLimiter::new();

        limiter.allow("key1", 1, 60, at(0));
        assert!(!limiter.allow("key1", 1, 60, at(1)));

        limiter.reset("key1");
        assert!(limiter.allow("key1", 1, 60, at(2)));
    }

    #[test]
    fn test_sweep_discards_idle_keys() {
        let limiter = SlidingWindowRateLimiter::new().with_sweep_interval(60);

        limiter.allow("idle", 10, 60, at(0));
        limiter.allow("active", 10, 60, at(0));
        assert_eq!(limiter.tracked_keys(), 2);

        limiter.allow("active", 10, 60, at(120));
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_concurrent_callers_never_over_admit() {
        let limiter = SlidingWindowRateLimiter::new();
        let admitted = AtomicUsize::new(0);
        let now = at(0);

        std::thread::scope(|scope| {
            for _ in 0..16 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        if limiter.allow("shared", 100, 3600, now) {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert_eq!(admitted.load(Ordering::SeqCst), 100);
        assert_eq!(limiter.headers("shared", 100, 3600, now).remaining, 0);
    }
}
