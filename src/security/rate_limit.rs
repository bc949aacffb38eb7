//! Per-client fixed-window rate limiting.
//!
//! # Responsibilities
//! - Track request counts per client key in fixed windows
//! - Decide allow/deny atomically per key
//! - Sweep stale client windows in the background
//!
//! # Design Decisions
//! - Fixed window, not sliding: a client can burst up to 2× the capacity
//!   across a window boundary. Accepted trade-off for O(1) accounting.
//! - Denied requests never consume quota
//! - Window timestamps are epoch seconds so reset times can go straight
//!   into the X-RateLimit-Reset header

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;

/// Accounting for one client: requests seen in the current window.
#[derive(Debug)]
struct ClientWindow {
    window_start: u64,
    count: u32,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    /// Route is not rate limited; no accounting was done.
    Exempt,
    /// Request admitted; header values for the response.
    Allowed {
        limit: u32,
        remaining: u32,
        reset_at: u64,
    },
    /// Quota exhausted until `reset_at` (epoch seconds).
    Denied { limit: u32, reset_at: u64 },
}

/// Fixed-window request counter keyed by client identity.
///
/// The map is shared across concurrently executing requests; the
/// check-then-increment runs under the entry guard, so concurrent requests
/// from the same client cannot under- or over-count.
pub struct RateLimiter {
    windows: DashMap<String, ClientWindow>,
    window_secs: u64,
    max_requests: u32,
}

impl RateLimiter {
    /// Create a limiter from configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            window_secs: config.window_secs,
            max_requests: config.max_requests,
        }
    }

    /// Check one request from `client_key` against the route policy.
    pub fn check(&self, client_key: &str, rate_limited: bool) -> RateDecision {
        self.check_at(client_key, rate_limited, now_epoch_secs())
    }

    fn check_at(&self, client_key: &str, rate_limited: bool, now: u64) -> RateDecision {
        if !rate_limited {
            return RateDecision::Exempt;
        }

        let mut entry = self
            .windows
            .entry(client_key.to_string())
            .or_insert(ClientWindow {
                window_start: now,
                count: 0,
            });
        let window = entry.value_mut();

        if now >= window.window_start + self.window_secs {
            window.window_start = now;
            window.count = 0;
        }

        let reset_at = window.window_start + self.window_secs;

        if window.count >= self.max_requests {
            RateDecision::Denied {
                limit: self.max_requests,
                reset_at,
            }
        } else {
            window.count += 1;
            RateDecision::Allowed {
                limit: self.max_requests,
                remaining: self.max_requests - window.count,
                reset_at,
            }
        }
    }

    /// Remove windows that expired more than two window lengths ago.
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(now_epoch_secs())
    }

    fn sweep_at(&self, now: u64) -> usize {
        let cutoff = 2 * self.window_secs;
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now < w.window_start + self.window_secs + cutoff);
        before - self.windows.len()
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Periodically sweep stale client windows until shutdown.
pub async fn sweep_loop(
    limiter: Arc<RateLimiter>,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = time::interval(interval);
    // The first tick fires immediately; skip it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let removed = limiter.sweep();
                if removed > 0 {
                    tracing::debug!(
                        removed,
                        tracked = limiter.tracked_clients(),
                        "Swept stale rate-limit windows"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("Rate-limit sweeper received shutdown signal, exiting loop");
                break;
            }
        }
    }
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
