use dashmap::DashMap;
use std::time::{Duration, Instant};

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window request counter keyed by client address.
///
/// Increment-and-check happens under the map's entry lock, so concurrent
/// requests from the same client cannot lose updates. Counters live for the
/// process lifetime; an expired window is reset in place on the next check.
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    max_requests: u32,
    window: Duration,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        FixedWindowLimiter {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    /// Record one request for `key`. Returns false when the client is over
    /// the cap for the current window.
    pub fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        if entry.count >= self.max_requests {
            return false;
        }
        entry.count += 1;
        true
    }
}
