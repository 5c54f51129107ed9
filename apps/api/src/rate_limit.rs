//! Fixed-window per-key request throttle.
//!
//! Process-local only: each instance keeps its own table, nothing survives a
//! restart. Correctness rests on the expiry check inside [`RateLimiter::check`];
//! the periodic sweep merely bounds memory growth.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

/// How often the background sweeper drops expired records.
const SWEEP_INTERVAL_SECS: u64 = 600;

/// Per-key throttle state for the current window.
#[derive(Debug, Clone)]
struct RateLimitRecord {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Outcome of a single throttle check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub limited: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

/// In-memory fixed-window counter, shared across handlers via `AppState`.
///
/// The mutex serializes the read-check-increment step so concurrent requests
/// for the same key cannot lose updates. The table is small (one entry per
/// active client in the last window), so contention is not a concern.
#[derive(Debug, Default)]
pub struct RateLimiter {
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and counts one request for `key` against `limit` per `window`.
    pub fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        self.check_at(key, limit, window, Utc::now())
    }

    /// Clock-explicit variant of [`check`](Self::check); the public entry point
    /// passes `Utc::now()`.
    fn check_at(
        &self,
        key: &str,
        limit: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> RateLimitDecision {
        let mut records = self.records.lock().expect("rate limit table poisoned");

        // Stale records count as absent and fall through to the fresh path.
        if let Some(record) = records.get_mut(key) {
            if now <= record.reset_at {
                if record.count >= limit {
                    // At the cap: report limited without touching the count,
                    // so the stored count never exceeds the limit.
                    return RateLimitDecision {
                        limited: true,
                        remaining: 0,
                        reset_at: record.reset_at,
                    };
                }
                record.count += 1;
                return RateLimitDecision {
                    limited: false,
                    remaining: limit - record.count,
                    reset_at: record.reset_at,
                };
            }
        }

        let reset_at = now + window;
        records.insert(key.to_string(), RateLimitRecord { count: 1, reset_at });
        RateLimitDecision {
            limited: false,
            remaining: limit.saturating_sub(1),
            reset_at,
        }
    }

    /// Drops every record whose window has already ended.
    pub fn sweep(&self) {
        self.sweep_at(Utc::now());
    }

    fn sweep_at(&self, now: DateTime<Utc>) {
        let mut records = self.records.lock().expect("rate limit table poisoned");
        let before = records.len();
        records.retain(|_, record| now <= record.reset_at);
        let dropped = before - records.len();
        if dropped > 0 {
            debug!("Rate limit sweep dropped {dropped} expired record(s)");
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.lock().expect("rate limit table poisoned").len()
    }
}

/// Spawns the housekeeping task that sweeps expired records every 10 minutes.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>) {
    tokio::spawn(async move {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
        // First tick fires immediately; harmless on an empty table.
        loop {
            interval.tick().await;
            limiter.sweep();
        }
    });
}
