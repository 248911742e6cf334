//! Health gate for the ranking backends.
//!
//! A backend that fails `failure_threshold` times in a row is skipped until
//! `cooldown_secs` have passed; the next call after that is a single probe.
//! A skipped call counts as a degraded result, never as a retry.
//!
//! ```text
//! ┌────────┐  N failures   ┌────────┐  cooldown   ┌──────────┐
//! │ Closed ├──────────────►│  Open  ├────────────►│ HalfOpen │
//! └───▲────┘               └───▲────┘             └────┬─────┘
//!     │        success         │       failure         │
//!     └────────────────────────┴───────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::types::Backend;

/// Circuit state for a single backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Backend is healthy; calls go through.
    Closed,
    /// Backend failed repeatedly; calls are skipped until cooldown expires.
    Open,
    /// Cooldown elapsed; one probe call decides the next state.
    HalfOpen,
}

#[derive(Debug, Clone)]
struct BackendHealth {
    state: CircuitState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

impl Default for BackendHealth {
    fn default() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            probe_in_flight: false,
        }
    }
}

/// Circuit breaker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// When `false` every call is attempted.
    pub enabled: bool,
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// Seconds an open circuit waits before allowing a probe.
    pub cooldown_secs: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: 3,
            cooldown_secs: 30,
        }
    }
}

/// Tracks consecutive failures per [`Backend`].
///
/// Owned by one orchestrator; callers wrap it in a mutex and must not hold
/// the guard across an `.await`.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    backends: HashMap<Backend, BackendHealth>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            backends: HashMap::new(),
        }
    }

    /// Record a successful call. Closes the circuit.
    pub fn record_success(&mut self, backend: Backend) {
        let health = self.backends.entry(backend).or_default();
        health.state = CircuitState::Closed;
        health.consecutive_failures = 0;
        health.opened_at = None;
        health.probe_in_flight = false;
    }

    /// Record a failed call. Opens the circuit once the threshold is reached,
    /// and immediately if the failing call was the half-open probe.
    pub fn record_failure(&mut self, backend: Backend) {
        let threshold = self.config.failure_threshold.max(1);
        let health = self.backends.entry(backend).or_default();
        health.consecutive_failures = health.consecutive_failures.saturating_add(1);
        health.probe_in_flight = false;

        if health.state == CircuitState::HalfOpen || health.consecutive_failures >= threshold {
            if health.state != CircuitState::Open {
                tracing::warn!(
                    %backend,
                    failures = health.consecutive_failures,
                    "circuit opened"
                );
            }
            health.state = CircuitState::Open;
            health.opened_at = Some(Instant::now());
        }
    }

    /// Whether a call to `backend` should be made now.
    ///
    /// An open circuit whose cooldown has elapsed moves to
    /// [`CircuitState::HalfOpen`] and allows exactly one call. Further calls
    /// are refused until that probe is recorded as a success or failure.
    pub fn should_attempt(&mut self, backend: Backend) -> bool {
        if !self.config.enabled {
            return true;
        }
        let cooldown = self.config.cooldown_secs;
        let health = self.backends.entry(backend).or_default();

        match health.state {
            CircuitState::Closed => true,
            CircuitState::HalfOpen => {
                if health.probe_in_flight {
                    return false;
                }
                health.probe_in_flight = true;
                true
            }
            CircuitState::Open => {
                let cooled = health
                    .opened_at
                    .is_none_or(|t| t.elapsed().as_secs() >= cooldown);
                if cooled {
                    tracing::debug!(%backend, "circuit half-open, probing");
                    health.state = CircuitState::HalfOpen;
                    health.probe_in_flight = true;
                }
                cooled
            }
        }
    }

    pub fn state(&self, backend: Backend) -> CircuitState {
        self.backends
            .get(&backend)
            .map_or(CircuitState::Closed, |h| h.state)
    }

    pub fn consecutive_failures(&self, backend: Backend) -> u32 {
        self.backends
            .get(&backend)
            .map_or(0, |h| h.consecutive_failures)
    }

    /// Forget all recorded health.
    pub fn reset(&mut self) {
        self.backends.clear();
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(CircuitBreakerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_breaker(threshold: u32, cooldown_secs: u64) -> CircuitBreaker {
        CircuitBreaker::new(CircuitBreakerConfig {
            enabled: true,
            failure_threshold: threshold,
            cooldown_secs,
        })
    }

    #[test]
    fn initial_state_is_closed() {
        let breaker = make_breaker(3, 60);
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(Backend::Semantic), 0);
    }

    #[test]
    fn stays_closed_below_threshold() {
        let mut breaker = make_breaker(3, 60);
        breaker.record_failure(Backend::Semantic);
        breaker.record_failure(Backend::Semantic);
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Closed);
        assert!(breaker.should_attempt(Backend::Semantic));
    }

    #[test]
    fn opens_at_threshold_and_blocks() {
        let mut breaker = make_breaker(3, 600);
        for _ in 0..3 {
            breaker.record_failure(Backend::Semantic);
        }
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Open);
        assert!(!breaker.should_attempt(Backend::Semantic));
    }

    #[test]
    fn cooldown_moves_to_half_open() {
        let mut breaker = make_breaker(1, 0);
        breaker.record_failure(Backend::Semantic);
        assert!(breaker.should_attempt(Backend::Semantic));
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::HalfOpen);
    }

    #[test]
    fn half_open_allows_a_single_probe() {
        let mut breaker = make_breaker(1, 0);
        breaker.record_failure(Backend::Semantic);

        assert!(breaker.should_attempt(Backend::Semantic));
        assert!(!breaker.should_attempt(Backend::Semantic));
        assert!(!breaker.should_attempt(Backend::Semantic));
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::HalfOpen);
    }

    #[test]
    fn recorded_probe_releases_the_gate() {
        let mut breaker = make_breaker(1, 0);
        breaker.record_failure(Backend::Semantic);
        assert!(breaker.should_attempt(Backend::Semantic));

        // Failed probe reopens; with no cooldown the next call probes again.
        breaker.record_failure(Backend::Semantic);
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Open);
        assert!(breaker.should_attempt(Backend::Semantic));
        assert!(!breaker.should_attempt(Backend::Semantic));

        breaker.record_success(Backend::Semantic);
        assert!(breaker.should_attempt(Backend::Semantic));
        assert!(breaker.should_attempt(Backend::Semantic));
    }

    #[test]
    fn probe_success_closes() {
        let mut breaker = make_breaker(1, 0);
        breaker.record_failure(Backend::Semantic);
        let _ = breaker.should_attempt(Backend::Semantic);
        breaker.record_success(Backend::Semantic);
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(Backend::Semantic), 0);
    }

    #[test]
    fn probe_failure_reopens_immediately() {
        let mut breaker = make_breaker(5, 0);
        for _ in 0..5 {
            breaker.record_failure(Backend::Semantic);
        }
        let _ = breaker.should_attempt(Backend::Semantic);
        breaker.record_failure(Backend::Semantic);
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Open);
    }

    #[test]
    fn backends_are_independent() {
        let mut breaker = make_breaker(1, 600);
        breaker.record_failure(Backend::Semantic);
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Open);
        assert_eq!(breaker.state(Backend::Lexical), CircuitState::Closed);
        assert!(breaker.should_attempt(Backend::Lexical));
    }

    #[test]
    fn alternating_results_never_trip() {
        let mut breaker = make_breaker(2, 60);
        for _ in 0..10 {
            breaker.record_failure(Backend::Semantic);
            breaker.record_success(Backend::Semantic);
        }
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Closed);
    }

    #[test]
    fn disabled_breaker_always_attempts() {
        let mut breaker = CircuitBreaker::new(CircuitBreakerConfig {
            enabled: false,
            failure_threshold: 1,
            cooldown_secs: 600,
        });
        breaker.record_failure(Backend::Semantic);
        assert!(breaker.should_attempt(Backend::Semantic));
    }

    #[test]
    fn reset_clears_state() {
        let mut breaker = make_breaker(1, 600);
        breaker.record_failure(Backend::Semantic);
        breaker.reset();
        assert_eq!(breaker.state(Backend::Semantic), CircuitState::Closed);
    }
}
