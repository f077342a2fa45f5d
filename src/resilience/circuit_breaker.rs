//! Circuit breaker for remote dependency protection.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: testing if dependency recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches failure_threshold
//! Open → Half-Open: recovery timeout elapses (derived, not stored)
//! Half-Open → Closed: probe call succeeds
//! Half-Open → Open: probe call fails, timer restarts
//! ```
//!
//! # Design Decisions
//! - One breaker per protected client (cache and limiter never share one)
//! - Per-process state only; never persisted, reset on restart
//! - Half-open is derived: once the timeout elapses `is_open()` returns
//!   false while the failure count stays put, so exactly one caller gets
//!   through and its recorded outcome decides the next state
//! - Mutex over atomics: the count and timestamp must move together

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::observability::metrics;

/// Configuration for a circuit breaker instance.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures required to open the circuit.
    pub failure_threshold: u32,

    /// How long the circuit stays open before allowing a probe.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_millis(15_000),
        }
    }
}

/// Snapshot of a breaker's state, suitable for admin/status endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitStatus {
    pub is_open: bool,
    pub failures: u32,
    /// Milliseconds until a probe is allowed. `None` while closed,
    /// `Some(0)` once the recovery timeout has fully elapsed.
    pub recovery_in: Option<u64>,
}

#[derive(Debug)]
struct BreakerState {
    failure_count: u32,
    opened_at: Option<Instant>,
}

/// Tracks consecutive failures of calls to one remote dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging and metrics.
    name: &'static str,
    config: CircuitBreakerConfig,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            state: Mutex::new(BreakerState {
                failure_count: 0,
                opened_at: None,
            }),
        }
    }

    /// Record a successful call, closing the circuit.
    ///
    /// Recovery from a prior failure streak is logged; a success while
    /// already at zero failures is silent.
    pub fn record_success(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        if state.failure_count > 0 {
            tracing::info!(
                component = self.name,
                failures = state.failure_count,
                "Circuit breaker closed (recovered)"
            );
            metrics::record_circuit_transition(self.name, "closed");
        }
        state.failure_count = 0;
        state.opened_at = None;
    }

    /// Record a failed call. Reaching the threshold opens the circuit;
    /// any further failure (a failed probe) restarts the timer.
    pub fn record_failure(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        state.failure_count += 1;

        if state.failure_count == self.config.failure_threshold {
            tracing::warn!(
                component = self.name,
                failures = state.failure_count,
                recovery_timeout_ms = self.config.recovery_timeout.as_millis() as u64,
                "Circuit breaker opened (failing fast)"
            );
            metrics::record_circuit_transition(self.name, "open");
        } else if state.failure_count > self.config.failure_threshold {
            tracing::warn!(
                component = self.name,
                failures = state.failure_count,
                "Probe failed, circuit breaker reopened"
            );
            metrics::record_circuit_transition(self.name, "reopen");
        }

        if state.failure_count >= self.config.failure_threshold {
            state.opened_at = Some(Instant::now());
        }
    }

    /// True iff the circuit is in its open window: threshold reached and
    /// the recovery timeout has not yet elapsed. Returns false after the
    /// timeout so one probe call gets through.
    pub fn is_open(&self) -> bool {
        let state = self.state.lock().expect("circuit breaker mutex poisoned");
        self.in_open_window(&state)
    }

    /// Current state snapshot.
    pub fn status(&self) -> CircuitStatus {
        let state = self.state.lock().expect("circuit breaker mutex poisoned");

        if state.failure_count < self.config.failure_threshold {
            return CircuitStatus {
                is_open: false,
                failures: state.failure_count,
                recovery_in: None,
            };
        }

        let remaining = state
            .opened_at
            .map(|opened| {
                self.config
                    .recovery_timeout
                    .saturating_sub(opened.elapsed())
                    .as_millis() as u64
            })
            .unwrap_or(0);

        CircuitStatus {
            is_open: remaining > 0,
            failures: state.failure_count,
            recovery_in: Some(remaining),
        }
    }

    /// Administrative full reset to closed/zero.
    pub fn reset(&self) {
        let mut state = self.state.lock().expect("circuit breaker mutex poisoned");
        state.failure_count = 0;
        state.opened_at = None;
        tracing::info!(component = self.name, "Circuit breaker reset");
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn in_open_window(&self, state: &BreakerState) -> bool {
        if state.failure_count < self.config.failure_threshold {
            return false;
        }
        matches!(state.opened_at, Some(opened) if opened.elapsed() < self.config.recovery_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn breaker(timeout_ms: u64) -> CircuitBreaker {
        CircuitBreaker::new(
            "test",
            CircuitBreakerConfig {
                failure_threshold: 3,
                recovery_timeout: Duration::from_millis(timeout_ms),
            },
        )
    }

    #[test]
    fn stays_closed_below_threshold() {
        let cb = breaker(15_000);
        cb.record_failure();
        cb.record_failure();
        assert!(!cb.is_open());
        assert_eq!(cb.status().failures, 2);
        assert_eq!(cb.status().recovery_in, None);
    }

    #[test]
    fn opens_on_third_consecutive_failure() {
        let cb = breaker(15_000);
        for _ in 0..3 {
            cb.record_failure();
        }
        assert!(cb.is_open());

        let status = cb.status();
        assert!(status.is_open);
        assert_eq!(status.failures, 3);
        assert!(status.recovery_in.is_some());
    }

    #[test]
    fn success_resets_failure_streak() {
        let cb = breaker(15_000);
        cb.record_failure();
        cb.record_failure();
        cb.record_failure();
        assert!(cb.is_open());

        cb.record_success();
        assert!(!cb.is_open());
        assert_eq!(
            cb.status(),
            CircuitStatus {
                is_open: false,
                failures: 0,
                recovery_in: None,
            }
        );
    }

    #[test]
    fn recovery_countdown_reaches_zero() {
        let cb = breaker(400);
        for _ in 0..3 {
            cb.record_failure();
        }

        sleep(Duration::from_millis(50));
        let mid = cb.status();
        assert!(mid.is_open);
        let remaining = mid.recovery_in.unwrap();
        assert!(remaining > 0 && remaining <= 350, "remaining = {remaining}");

        sleep(Duration::from_millis(400));
        let after = cb.status();
        assert!(!after.is_open);
        assert_eq!(after.recovery_in, Some(0));
        assert_eq!(after.failures, 3);
        // Probe is allowed even though failures were never reset.
        assert!(!cb.is_open());
    }

    #[test]
    fn failed_probe_reopens_and_restarts_timer() {
        let cb = breaker(50);
        for _ in 0..3 {
            cb.record_failure();
        }
        sleep(Duration::from_millis(70));
        assert!(!cb.is_open());

        cb.record_failure();
        assert!(cb.is_open());
        assert_eq!(cb.status().failures, 4);
    }

    #[test]
    fn successful_probe_closes_fully() {
        let cb = breaker(50);
        for _ in 0..3 {
            cb.record_failure();
        }
        sleep(Duration::from_millis(70));
        assert!(!cb.is_open());

        cb.record_success();
        assert_eq!(cb.status().failures, 0);
        assert_eq!(cb.status().recovery_in, None);
    }

    #[test]
    fn reset_returns_to_closed() {
        let cb = breaker(15_000);
        for _ in 0..5 {
            cb.record_failure();
        }
        assert!(cb.is_open());

        cb.reset();
        assert!(!cb.is_open());
        assert_eq!(cb.status().failures, 0);
    }
}
