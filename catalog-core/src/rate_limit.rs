use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};

/// Length of one counting window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Requests allowed per identifier per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 30;
/// Tracked identifiers above which expired entries are swept.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

/// Outcome of a single [`RateLimiter::check`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    reset_at: i64,
}

/// 固定窗口计数限流器（基于内存，按 key 计数，仅在本进程内生效）。
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    sweep_threshold: usize,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, Arc::new(SystemClock))
    }

    pub fn with_clock(limit: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            limit,
            window,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count one request for `key` and report whether it may proceed.
    ///
    /// An entry whose `reset_at` lies in the past is replaced by a fresh
    /// window; a denied request does not bump the counter.
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock().await;

        // 条目过多时清理已过期窗口，只是尽力而为的内存上限
        if entries.len() > self.sweep_threshold {
            let before = entries.len();
            entries.retain(|_, entry| entry.reset_at >= now);
            tracing::debug!(
                removed = before - entries.len(),
                remaining = entries.len(),
                "swept expired rate limit entries"
            );
        }

        match entries.get_mut(key) {
            Some(entry) if entry.reset_at >= now => {
                if entry.count >= self.limit {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                    };
                }
                entry.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: self.limit - entry.count,
                }
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        reset_at: now + self.window.as_millis() as i64,
                    },
                );
                RateLimitDecision {
                    allowed: true,
                    remaining: self.limit.saturating_sub(1),
                }
            }
        }
    }

    /// Number of identifiers currently held in memory.
    pub async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn limiter(clock: &Arc<ManualClock>) -> RateLimiter {
        RateLimiter::with_clock(DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW, clock.clone())
    }

    #[tokio::test]
    async fn remaining_counts_down_to_zero() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);

        for expected in (0..30).rev() {
            let decision = limiter.check("10.0.0.1").await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected);
            clock.advance(Duration::from_millis(500));
        }
    }

    #[tokio::test]
    async fn thirty_first_request_is_denied() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);
        for _ in 0..30 {
            assert!(limiter.check("ip").await.allowed);
        }

        let denied = limiter.check("ip").await;
        assert_eq!(
            denied,
            RateLimitDecision {
                allowed: false,
                remaining: 0
            }
        );
        // still denied, the counter is not pushed further
        assert!(!limiter.check("ip").await.allowed);
    }

    #[tokio::test]
    async fn window_expiry_starts_fresh() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);
        for _ in 0..31 {
            limiter.check("ip").await;
        }

        // reset_at itself still belongs to the old window
        clock.set(60_000);
        assert!(!limiter.check("ip").await.allowed);

        clock.set(60_001);
        let decision = limiter.check("ip").await;
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 29);
    }

    #[tokio::test]
    async fn identifiers_are_independent() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = RateLimiter::with_clock(1, DEFAULT_WINDOW, clock.clone());

        assert!(limiter.check("a").await.allowed);
        assert!(!limiter.check("a").await.allowed);
        assert!(limiter.check("b").await.allowed);
        assert_eq!(limiter.limit(), 1);
        assert_eq!(RateLimiter::default().limit(), DEFAULT_MAX_REQUESTS);
    }

    #[tokio::test]
    async fn sweep_drops_only_expired_entries() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock).with_sweep_threshold(2);

        for key in ["a", "b", "c"] {
            limiter.check(key).await;
        }
        assert_eq!(limiter.tracked().await, 3);

        // over threshold but nothing expired yet
        clock.advance(Duration::from_secs(30));
        limiter.check("d").await;
        assert_eq!(limiter.tracked().await, 4);

        // a, b, c expire at 60s; d lives until 90s
        clock.set(61_000);
        limiter.check("e").await;
        assert_eq!(limiter.tracked().await, 2);
    }

    #[tokio::test]
    async fn no_sweep_under_threshold() {
        let clock = Arc::new(ManualClock::new(0));
        let limiter = limiter(&clock);
        limiter.check("a").await;
        clock.advance(Duration::from_secs(120));
        limiter.check("b").await;
        assert_eq!(limiter.tracked().await, 2);
    }
}
