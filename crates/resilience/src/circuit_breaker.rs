//! Circuit Breaker implementation for fault isolation
//!
//! The circuit breaker stops calling a dependency that keeps failing. It has
//! three states:
//! - Closed: calls pass through; consecutive failures are counted
//! - Open: calls are rejected without reaching the dependency
//! - HalfOpen: a single trial call decides whether to close or reopen
//!
//! State is shared by every clone of a breaker and every transition is a
//! test-and-set under one lock, so concurrent callers cannot both win the
//! half-open trial.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::{Failure, ResilienceError};

/// Observable state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u32,
    /// How long the circuit stays open before a trial call is allowed
    pub recovery_timeout: Duration,
    /// Deadline for a single call; exceeding it counts as a failure
    pub call_timeout: Option<Duration>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(10),
            call_timeout: Some(Duration::from_secs(5)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Closed,
    Open { opened_at: Instant },
    HalfOpen { trial_in_flight: bool },
}

impl Mode {
    fn observable(&self) -> CircuitState {
        match self {
            Mode::Closed => CircuitState::Closed,
            Mode::Open { .. } => CircuitState::Open,
            Mode::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    mode: Mode,
    consecutive_failures: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PermitKind {
    Normal,
    Trial,
}

/// Admission ticket for one call. Settles the breaker with the call's
/// outcome; a trial permit dropped unsettled (caller cancelled) frees the
/// half-open slot for the next caller.
struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    kind: PermitKind,
    settled: bool,
}

impl Permit<'_> {
    fn succeed(mut self) {
        self.settled = true;
        self.breaker.on_success(self.kind);
    }

    fn fail(mut self, reason: &dyn std::fmt::Display) {
        self.settled = true;
        self.breaker.on_failure(self.kind, reason);
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.settled && self.kind == PermitKind::Trial {
            self.breaker.release_trial();
        }
    }
}

/// Circuit breaker guarding a single dependency.
///
/// Cloning is cheap and clones share state, so one breaker can be handed
/// to every request that targets the same dependency.
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    name: Arc<str>,
    config: Arc<CircuitBreakerConfig>,
    state: Arc<Mutex<BreakerState>>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given name and configuration
    pub fn new(name: impl Into<Arc<str>>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
            state: Arc::new(Mutex::new(BreakerState {
                mode: Mode::Closed,
                consecutive_failures: 0,
            })),
        }
    }

    /// The dependency name used in logs and metrics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configuration this breaker was built with.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state. An open breaker whose recovery timeout has elapsed
    /// still reports `Open` until the next call moves it to `HalfOpen`.
    pub fn state(&self) -> CircuitState {
        self.lock().mode.observable()
    }

    /// Current consecutive failure count
    pub fn failure_count(&self) -> u32 {
        self.lock().consecutive_failures
    }

    /// Force the breaker back to closed with a clean failure count
    pub fn reset(&self) {
        let mut state = self.lock();
        let from = state.mode.observable();
        state.mode = Mode::Closed;
        state.consecutive_failures = 0;
        if from != CircuitState::Closed {
            self.record_transition(from, CircuitState::Closed, 0);
        }
    }

    /// Execute `op` under breaker protection.
    ///
    /// Returns `CircuitOpen` without invoking `op` while the circuit is open
    /// or a half-open trial is already in flight. An error from `op`, or a
    /// call exceeding `call_timeout`, is reported as `Failed` and counted
    /// against the breaker.
    pub async fn call<F, Fut, T, E>(&self, op: F) -> Result<T, ResilienceError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let Some(permit) = self.admit() else {
            metrics::counter!("breaker_rejections_total", "breaker" => self.name.to_string())
                .increment(1);
            tracing::debug!(breaker = %self.name, "call rejected, circuit open");
            return Err(ResilienceError::CircuitOpen {
                breaker: self.name.to_string(),
            });
        };

        let outcome = match self.config.call_timeout {
            Some(limit) => match tokio::time::timeout(limit, op()).await {
                Ok(result) => result.map_err(Failure::Inner),
                Err(_) => Err(Failure::Timeout(limit)),
            },
            None => op().await.map_err(Failure::Inner),
        };

        match outcome {
            Ok(value) => {
                permit.succeed();
                Ok(value)
            }
            Err(failure) => {
                permit.fail(&failure);
                Err(ResilienceError::Failed(failure))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Option<Permit<'_>> {
        let mut state = self.lock();

        let kind = match state.mode {
            Mode::Closed => PermitKind::Normal,
            Mode::Open { opened_at } => {
                if opened_at.elapsed() < self.config.recovery_timeout {
                    return None;
                }
                state.mode = Mode::HalfOpen {
                    trial_in_flight: true,
                };
                self.record_transition(
                    CircuitState::Open,
                    CircuitState::HalfOpen,
                    state.consecutive_failures,
                );
                PermitKind::Trial
            }
            Mode::HalfOpen {
                trial_in_flight: true,
            } => return None,
            Mode::HalfOpen {
                trial_in_flight: false,
            } => {
                state.mode = Mode::HalfOpen {
                    trial_in_flight: true,
                };
                PermitKind::Trial
            }
        };

        Some(Permit {
            breaker: self,
            kind,
            settled: false,
        })
    }

    fn on_success(&self, kind: PermitKind) {
        let mut state = self.lock();

        match (kind, state.mode) {
            (_, Mode::Closed) => state.consecutive_failures = 0,
            (PermitKind::Trial, Mode::HalfOpen { .. }) => {
                state.mode = Mode::Closed;
                state.consecutive_failures = 0;
                self.record_transition(CircuitState::HalfOpen, CircuitState::Closed, 0);
            }
            // A call admitted before the circuit opened finished late.
            _ => {}
        }
    }

    fn on_failure(&self, kind: PermitKind, reason: &dyn std::fmt::Display) {
        let mut state = self.lock();

        match (kind, state.mode) {
            (_, Mode::Closed) => {
                state.consecutive_failures += 1;
                tracing::debug!(
                    breaker = %self.name,
                    failures = state.consecutive_failures,
                    error = %reason,
                    "call failed"
                );
                if state.consecutive_failures >= self.config.failure_threshold {
                    state.mode = Mode::Open {
                        opened_at: Instant::now(),
                    };
                    self.record_transition(
                        CircuitState::Closed,
                        CircuitState::Open,
                        state.consecutive_failures,
                    );
                }
            }
            (PermitKind::Trial, Mode::HalfOpen { .. }) => {
                state.consecutive_failures += 1;
                state.mode = Mode::Open {
                    opened_at: Instant::now(),
                };
                tracing::debug!(breaker = %self.name, error = %reason, "trial call failed");
                self.record_transition(
                    CircuitState::HalfOpen,
                    CircuitState::Open,
                    state.consecutive_failures,
                );
            }
            _ => {}
        }
    }

    fn release_trial(&self) {
        let mut state = self.lock();
        if let Mode::HalfOpen {
            trial_in_flight: true,
        } = state.mode
        {
            state.mode = Mode::HalfOpen {
                trial_in_flight: false,
            };
            tracing::debug!(breaker = %self.name, "trial call abandoned");
        }
    }

    fn record_transition(&self, from: CircuitState, to: CircuitState, failures: u32) {
        metrics::counter!(
            "breaker_transitions_total",
            "breaker" => self.name.to_string(),
            "to" => to.as_str()
        )
        .increment(1);

        match to {
            CircuitState::Open => tracing::warn!(
                breaker = %self.name,
                %from,
                %to,
                failures,
                "circuit breaker opened"
            ),
            _ => tracing::info!(
                breaker = %self.name,
                %from,
                %to,
                failures,
                "circuit breaker state changed"
            ),
        }
    }
}
