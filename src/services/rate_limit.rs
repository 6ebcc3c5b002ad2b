//! Per-IP creation throttle
//!
//! Fixed window, in-memory, local to one process instance. Purpose is abuse
//! damping, not billing-grade accounting, so no cross-instance coordination.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);
const MAX_REQUESTS: u32 = 8;

// Expired buckets are swept once the map grows past this, keeping it bounded.
const PRUNE_THRESHOLD: usize = 4096;

struct Bucket {
    count: u32,
    reset_at: Instant,
}

#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<Mutex<HashMap<String, Bucket>>>,
    window: Duration,
    max_requests: u32,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(WINDOW, MAX_REQUESTS)
    }

    pub fn with_limits(window: Duration, max_requests: u32) -> Self {
        RateLimiter {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests,
        }
    }

    /// Returns false when the caller has exhausted the current window.
    /// Requests without a resolvable client IP are never throttled.
    pub fn allow(&self, ip: Option<&str>) -> bool {
        let Some(ip) = ip else {
            return true;
        };
        let now = Instant::now();
        let mut buckets = self.buckets.lock();

        if buckets.len() > PRUNE_THRESHOLD {
            buckets.retain(|_, bucket| bucket.reset_at > now);
        }

        match buckets.get_mut(ip) {
            Some(bucket) if bucket.reset_at > now => {
                if bucket.count >= self.max_requests {
                    return false;
                }
                bucket.count += 1;
                true
            }
            _ => {
                buckets.insert(
                    ip.to_string(),
                    Bucket {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new();
        for _ in 0..8 {
            assert!(limiter.allow(Some("10.0.0.1")));
        }
        assert!(!limiter.allow(Some("10.0.0.1")));
    }

    #[test]
    fn test_buckets_are_per_ip() {
        let limiter = RateLimiter::with_limits(WINDOW, 1);
        assert!(limiter.allow(Some("10.0.0.1")));
        assert!(!limiter.allow(Some("10.0.0.1")));
        assert!(limiter.allow(Some("10.0.0.2")));
    }

    #[test]
    fn test_missing_ip_is_never_throttled() {
        let limiter = RateLimiter::with_limits(WINDOW, 1);
        for _ in 0..20 {
            assert!(limiter.allow(None));
        }
    }

    #[test]
    fn test_window_resets() {
        let limiter = RateLimiter::with_limits(Duration::from_millis(10), 1);
        assert!(limiter.allow(Some("10.0.0.1")));
        assert!(!limiter.allow(Some("10.0.0.1")));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.allow(Some("10.0.0.1")));
    }
}
