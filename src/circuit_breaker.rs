// =============================================================================
// circuit_breaker.rs — THE RESILIENCE GUARDIAN
// =============================================================================
//
// The Circuit Breaker pattern, as applied to bulk-downloading the federal
// motor carrier census.
//
// When data.transportation.gov goes down (and it WILL go down — it's a
// government website), we don't want to keep hammering it with 50,000-row
// page requests. That would be:
// 1. Pointless (the server is down)
// 2. Rude (they have enough problems)
// 3. Potentially grounds for getting IP-banned from the open-data portal
//    we depend on for literally everything
//
// After N consecutive failures the breaker "trips" and fetches stop for a
// cooldown period. After the cooldown we allow one tentative request (the
// "half-open" state). If it works, normal operations resume. If it fails,
// back to timeout purgatory.
//
// The retry/backoff loop in the SODA client handles the fast wobble;
// this handles the slow outage. Between the two of them, an ingestion
// stage either finishes or fails honestly into its SyncRun row.
// =============================================================================

use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// The three states of a circuit breaker, mirroring the three states of
/// a carrier's operating authority:
///
/// - Closed: requests flow freely (AUTHORIZED)
/// - Open: no requests allowed (OUT OF SERVICE)
/// - HalfOpen: one probe allowed to see if things recovered (PENDING)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

/// A circuit breaker guarding one upstream endpoint.
pub struct CircuitBreaker {
    name: &'static str,
    failure_threshold: u32,
    reset_timeout: Duration,
    success_threshold: u32,
    inner: RwLock<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(
        name: &'static str,
        failure_threshold: u32,
        reset_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        Self {
            name,
            failure_threshold,
            reset_timeout,
            success_threshold,
            inner: RwLock::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// May a request go out right now? An Open breaker whose cooldown has
    /// elapsed transitions to HalfOpen and lets exactly this caller probe.
    pub fn allow_request(&self) -> bool {
        {
            let inner = self.inner.read();
            match inner.state {
                CircuitState::Closed | CircuitState::HalfOpen => return true,
                CircuitState::Open => {
                    let cooled = inner
                        .opened_at
                        .map(|t| t.elapsed() >= self.reset_timeout)
                        .unwrap_or(true);
                    if !cooled {
                        return false;
                    }
                }
            }
        }

        let mut inner = self.inner.write();
        // Re-check under the write lock; another caller may have probed first.
        if inner.state == CircuitState::Open {
            let cooled = inner
                .opened_at
                .map(|t| t.elapsed() >= self.reset_timeout)
                .unwrap_or(true);
            if cooled {
                inner.state = CircuitState::HalfOpen;
                inner.half_open_successes = 0;
                info!(
                    breaker = self.name,
                    "circuit breaker half-open — sending a probe request"
                );
            }
        }
        inner.state != CircuitState::Open
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.write();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            CircuitState::HalfOpen => {
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.consecutive_failures = 0;
                    inner.opened_at = None;
                    info!(
                        breaker = self.name,
                        "circuit breaker closed — upstream has recovered"
                    );
                }
            }
            CircuitState::Open => {
                // A success while Open means a caller raced allow_request;
                // treat it as a half-open probe that worked.
                inner.state = CircuitState::HalfOpen;
                inner.half_open_successes = 1;
            }
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.write();
        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    warn!(
                        breaker = self.name,
                        failures = inner.consecutive_failures,
                        cooldown_secs = self.reset_timeout.as_secs(),
                        "circuit breaker OPEN — backing off the upstream"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!(
                    breaker = self.name,
                    "probe failed — circuit breaker re-opened"
                );
            }
            CircuitState::Open => {}
        }
    }

    pub fn state(&self) -> CircuitState {
        self.inner.read().state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker() -> CircuitBreaker {
        CircuitBreaker::new("test", 3, Duration::from_secs(60), 2)
    }

    #[test]
    fn starts_closed_and_allows_requests() {
        let cb = breaker();
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn trips_after_threshold_failures() {
        let cb = breaker();
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn success_resets_the_failure_streak() {
        let cb = breaker();
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_probe_closes_after_enough_successes() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_secs(0), 2);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        // Zero-second cooldown: the next allow_request transitions to probe.
        assert!(cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_probe_failure_reopens() {
        let cb = CircuitBreaker::new("test", 1, Duration::from_secs(0), 2);
        cb.record_failure();
        assert!(cb.allow_request());
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }
}
