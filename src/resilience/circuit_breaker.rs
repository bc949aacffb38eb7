//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: backend assumed down, requests fail fast
//! - HalfOpen: single trial request permitted to test recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures reach the threshold
//! Open → HalfOpen: reset timeout elapsed at the next admit
//! HalfOpen → Closed: trial request succeeds
//! HalfOpen → Open: trial request fails
//! ```
//!
//! No other edges exist. Only transport-level failures count; a backend
//! that answers with a 5xx has still answered.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::CircuitBreakerConfig;

/// Breaker position for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitStatus {
    Closed,
    Open,
    HalfOpen,
}

/// Failure accounting for one target.
#[derive(Debug)]
struct CircuitState {
    status: CircuitStatus,
    consecutive_failures: u32,
    last_failure_at: Option<Instant>,
}

impl Default for CircuitState {
    fn default() -> Self {
        Self {
            status: CircuitStatus::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
        }
    }
}

/// Per-target failure-tracking state machine.
///
/// State is created lazily on the first request to a target and lives for
/// the process lifetime. All transitions happen under the map's entry
/// guard, so concurrent requests observe a consistent machine.
pub struct CircuitBreaker {
    states: DashMap<String, CircuitState>,
    failure_threshold: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    /// Create a breaker from configuration.
    pub fn new(config: &CircuitBreakerConfig) -> Self {
        Self {
            states: DashMap::new(),
            failure_threshold: config.failure_threshold,
            reset_timeout: Duration::from_millis(config.reset_timeout_ms),
        }
    }

    /// Decide whether a request to `target` may proceed.
    ///
    /// In Open state, once the reset timeout has elapsed the circuit moves
    /// to HalfOpen and the admitted request becomes the trial.
    pub fn admit(&self, target: &str) -> bool {
        self.admit_at(target, Instant::now())
    }

    fn admit_at(&self, target: &str, now: Instant) -> bool {
        let mut entry = self.states.entry(target.to_string()).or_default();
        let state = entry.value_mut();

        match state.status {
            CircuitStatus::Closed | CircuitStatus::HalfOpen => true,
            CircuitStatus::Open => {
                let elapsed = state
                    .last_failure_at
                    .map_or(true, |t| now > t + self.reset_timeout);
                if elapsed {
                    state.status = CircuitStatus::HalfOpen;
                    tracing::warn!(target = %target, "Circuit breaker moving to HALF_OPEN, admitting trial request");
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Record a successful proxy operation against `target`.
    pub fn record_success(&self, target: &str) {
        let mut entry = self.states.entry(target.to_string()).or_default();
        let state = entry.value_mut();

        if state.status == CircuitStatus::HalfOpen {
            state.status = CircuitStatus::Closed;
            tracing::info!(target = %target, "Circuit breaker trial succeeded, closing circuit");
        }
        state.consecutive_failures = 0;
    }

    /// Record a transport-level failure against `target`.
    pub fn record_failure(&self, target: &str) {
        self.record_failure_at(target, Instant::now());
    }

    fn record_failure_at(&self, target: &str, now: Instant) {
        let mut entry = self.states.entry(target.to_string()).or_default();
        let state = entry.value_mut();

        state.consecutive_failures += 1;
        state.last_failure_at = Some(now);

        match state.status {
            CircuitStatus::HalfOpen => {
                state.status = CircuitStatus::Open;
                tracing::warn!(target = %target, "Circuit breaker trial failed, reopening circuit");
            }
            CircuitStatus::Closed if state.consecutive_failures >= self.failure_threshold => {
                state.status = CircuitStatus::Open;
                tracing::error!(
                    target = %target,
                    failures = state.consecutive_failures,
                    "Circuit breaker tripped, failing fast"
                );
            }
            _ => {}
        }
    }

    /// Current status for a target, if any requests have been recorded.
    pub fn status(&self, target: &str) -> Option<CircuitStatus> {
        self.states.get(target).map(|s| s.status)
    }
}
