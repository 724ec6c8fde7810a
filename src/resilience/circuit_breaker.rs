//! Circuit breaker for backend service protection.
//!
//! # States (derived from the counter, not stored)
//! - Closed: failure count below threshold, requests pass through
//! - Open: count at/above threshold within the cooldown window, fail fast
//! - Half-open: cooldown elapsed; the next admission check resets the
//!   counter and lets exactly that one request through
//!
//! # State Transitions
//! ```text
//! Closed → Open: failures >= threshold (the Nth failure trips)
//! Open → Closed: admission check after reset_timeout (counter reset to 0)
//! ```
//!
//! # Design Decisions
//! - Per-service breaker keyed by name, created lazily on first reference
//! - Successes never reset the counter; only cooldown expiry does, so
//!   failures accumulate toward the threshold even when interleaved with
//!   successes until a full quiet period passes
//! - Monotonic clock (`Instant`), immune to wall-clock adjustments

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::observability::metrics;

/// Breaker settings shared by all services.
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    /// Number of recorded failures that trips the breaker.
    pub failure_threshold: u32,
    /// Cooldown before a tripped breaker admits a probe.
    pub reset_timeout: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
        }
    }
}

/// Derived breaker phase, for logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerPhase {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Default)]
struct BreakerState {
    failures: u32,
    last_failure: Option<Instant>,
}

/// Per-service breaker states with exclusive internal synchronization.
///
/// `admit` and `record_failure` are linearizable per service: dashmap entry
/// locking serializes the read-modify-write, and no lock is held across an
/// await point or the network call itself.
#[derive(Debug)]
pub struct BreakerRegistry {
    config: BreakerConfig,
    states: DashMap<String, BreakerState>,
}

impl BreakerRegistry {
    pub fn new(config: BreakerConfig) -> Self {
        Self {
            config,
            states: DashMap::new(),
        }
    }

    /// Decide whether a request to `service` may proceed.
    ///
    /// Creates zeroed state on first reference. When the cooldown has
    /// elapsed past a tripped breaker, atomically resets the failure
    /// counter and admits that one probe request.
    pub fn admit(&self, service: &str) -> bool {
        self.admit_at(service, Instant::now())
    }

    fn admit_at(&self, service: &str, now: Instant) -> bool {
        let mut state = self.states.entry(service.to_string()).or_default();

        if state.failures < self.config.failure_threshold {
            return true;
        }

        match state.last_failure {
            Some(last) if now.duration_since(last) > self.config.reset_timeout => {
                state.failures = 0;
                state.last_failure = None;
                tracing::info!(service, "circuit breaker cooldown elapsed, admitting probe");
                true
            }
            Some(_) => false,
            // Tripped state always carries a failure timestamp; treat the
            // impossible combination as closed rather than wedging traffic.
            None => true,
        }
    }

    /// Record a transport failure against `service`.
    pub fn record_failure(&self, service: &str) {
        self.record_failure_at(service, Instant::now());
    }

    fn record_failure_at(&self, service: &str, now: Instant) {
        let mut state = self.states.entry(service.to_string()).or_default();
        state.failures += 1;
        state.last_failure = Some(now);

        if state.failures == self.config.failure_threshold {
            tracing::warn!(
                service,
                failures = state.failures,
                threshold = self.config.failure_threshold,
                "circuit breaker tripped"
            );
            metrics::record_breaker_trip(service);
        }
    }

    /// Record a completed exchange.
    ///
    /// Intentionally does nothing: the failure counter only resets on a
    /// cooldown-expiry admission check, never on individual successes.
    pub fn record_success(&self, _service: &str) {}

    /// Read-only view of a service's breaker, for logs and metrics.
    pub fn phase(&self, service: &str) -> BreakerPhase {
        self.phase_at(service, Instant::now())
    }

    fn phase_at(&self, service: &str, now: Instant) -> BreakerPhase {
        let Some(state) = self.states.get(service) else {
            return BreakerPhase::Closed;
        };

        if state.failures < self.config.failure_threshold {
            return BreakerPhase::Closed;
        }
        match state.last_failure {
            Some(last) if now.duration_since(last) > self.config.reset_timeout => {
                BreakerPhase::HalfOpen
            }
            Some(_) => BreakerPhase::Open,
            None => BreakerPhase::Closed,
        }
    }

    /// Current failure count for a service (0 if never referenced).
    pub fn failure_count(&self, service: &str) -> u32 {
        self.states.get(service).map(|s| s.failures).unwrap_or(0)
    }
}
