//! Circuit breaker for the simulated dependency.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: dependency assumed down, calls fail fast
//! - Half-Open: a few trial calls test whether it recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure rate >= threshold over the sliding window
//!                (once minimum_number_of_calls outcomes are buffered)
//! Open → Half-Open: after wait_duration_open_ms
//! Half-Open → Closed: trial failure rate below threshold
//! Half-Open → Open: trial failure rate at or above threshold
//! ```
//!
//! # Design Decisions
//! - One breaker per named instance, shared by every request using it
//! - Fail fast in Open state (no waiting for timeout)
//! - Lock is held for bookkeeping only, never while the operation runs
//! - Each permit is tied to the state it was granted in; outcomes that
//!   arrive after a transition are not counted

use futures_util::future::BoxFuture;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;
use crate::resilience::policy::{Operation, PolicyError, ResiliencePolicy};
use crate::service::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Numeric gauge value: 0 closed, 1 open, 2 half-open.
    pub fn as_gauge(self) -> f64 {
        match self {
            CircuitState::Closed => 0.0,
            CircuitState::Open => 1.0,
            CircuitState::HalfOpen => 2.0,
        }
    }
}

/// Point-in-time view of a breaker, served by the admin API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitSnapshot {
    pub name: String,
    pub state: CircuitState,
    /// Failure percentage over buffered calls; `None` until enough calls are buffered.
    pub failure_rate: Option<f32>,
    pub buffered_calls: usize,
    pub failed_calls: usize,
    pub not_permitted_calls: u64,
}

/// Permission for one call, valid for the state it was granted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a permit should be passed to `CircuitBreaker::record`"]
pub struct Permit {
    generation: u64,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    /// Bumped on every transition; outcomes from an older generation are dropped.
    generation: u64,
    /// Recent outcomes while closed, `true` = failure.
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    half_open_started: u32,
    /// Trial outcomes while half-open, `true` = failure.
    half_open_results: Vec<bool>,
    not_permitted: u64,
}

/// Count-based circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                generation: 0,
                window: VecDeque::new(),
                opened_at: None,
                half_open_started: 0,
                half_open_results: Vec::new(),
                not_permitted: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current state, applying the open → half-open timeout if it has elapsed.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        self.maybe_half_open(&mut inner);
        inner.state
    }

    /// Run `operation` if the breaker permits it and record the outcome.
    pub fn call<F>(&self, operation: F) -> Result<String, PolicyError>
    where
        F: FnOnce() -> Result<String, ServiceError>,
    {
        let permit = self.try_acquire()?;
        let result = operation();
        self.record(permit, result.is_err());
        result.map_err(PolicyError::from)
    }

    /// Ask permission for one call.
    pub fn try_acquire(&self) -> Result<Permit, PolicyError> {
        let mut inner = self.lock();
        self.maybe_half_open(&mut inner);

        let state = inner.state;
        let permitted = match state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.half_open_started < self.config.permitted_calls_in_half_open {
                    inner.half_open_started += 1;
                    true
                } else {
                    false
                }
            }
        };

        if permitted {
            Ok(Permit {
                generation: inner.generation,
            })
        } else {
            inner.not_permitted += 1;
            metrics::record_circuit_rejection(&self.name);
            tracing::debug!(policy = %self.name, state = ?state, "Call not permitted");
            Err(PolicyError::CircuitOpen {
                name: self.name.clone(),
            })
        }
    }

    /// Record the outcome of a permitted call.
    ///
    /// Outcomes of calls admitted before the last state change are ignored.
    pub fn record(&self, permit: Permit, failed: bool) {
        let mut inner = self.lock();
        if permit.generation != inner.generation {
            tracing::debug!(policy = %self.name, "Dropping outcome from a previous circuit state");
            return;
        }
        let state = inner.state;
        match state {
            CircuitState::Closed => {
                inner.window.push_back(failed);
                while inner.window.len() > self.config.sliding_window_size as usize {
                    inner.window.pop_front();
                }
                if let Some(rate) = self.window_failure_rate(&inner.window) {
                    if rate >= self.config.failure_rate_threshold {
                        self.transition(&mut inner, CircuitState::Open);
                    }
                }
            }
            CircuitState::HalfOpen => {
                inner.half_open_results.push(failed);
                let permitted = self.config.permitted_calls_in_half_open as usize;
                if inner.half_open_results.len() >= permitted {
                    let rate = failure_percent(&inner.half_open_results).unwrap_or(0.0);
                    if rate >= self.config.failure_rate_threshold {
                        self.transition(&mut inner, CircuitState::Open);
                    } else {
                        self.transition(&mut inner, CircuitState::Closed);
                    }
                }
            }
            // Unreachable with a current permit: Open grants none.
            CircuitState::Open => {}
        }
    }

    pub fn snapshot(&self) -> CircuitSnapshot {
        let mut inner = self.lock();
        self.maybe_half_open(&mut inner);

        let (buffered, failed, failure_rate) = match inner.state {
            CircuitState::HalfOpen => (
                inner.half_open_results.len(),
                count_failures(&inner.half_open_results),
                failure_percent(&inner.half_open_results),
            ),
            _ => (
                inner.window.len(),
                count_failures(&inner.window),
                self.window_failure_rate(&inner.window),
            ),
        };

        CircuitSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failure_rate,
            buffered_calls: buffered,
            failed_calls: failed,
            not_permitted_calls: inner.not_permitted,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn minimum_calls(&self) -> usize {
        self.config
            .minimum_number_of_calls
            .min(self.config.sliding_window_size) as usize
    }

    fn window_failure_rate(&self, window: &VecDeque<bool>) -> Option<f32> {
        if window.len() < self.minimum_calls() {
            return None;
        }
        failure_percent(window)
    }

    fn maybe_half_open(&self, inner: &mut BreakerState) {
        if inner.state != CircuitState::Open {
            return;
        }
        let wait = Duration::from_millis(self.config.wait_duration_open_ms);
        if inner.opened_at.is_some_and(|at| at.elapsed() >= wait) {
            self.transition(inner, CircuitState::HalfOpen);
        }
    }

    fn transition(&self, inner: &mut BreakerState, to: CircuitState) {
        let from = inner.state;
        inner.state = to;
        inner.generation += 1;
        inner.half_open_started = 0;
        inner.half_open_results.clear();

        match to {
            CircuitState::Open => inner.opened_at = Some(Instant::now()),
            CircuitState::Closed => {
                inner.opened_at = None;
                inner.window.clear();
            }
            CircuitState::HalfOpen => {}
        }

        metrics::record_circuit_state(&self.name, to);
        if to == CircuitState::Open {
            tracing::warn!(policy = %self.name, from = ?from, "Circuit breaker opened");
        } else {
            tracing::info!(policy = %self.name, from = ?from, to = ?to, "Circuit breaker state changed");
        }
    }
}

fn count_failures<'a>(outcomes: impl IntoIterator<Item = &'a bool>) -> usize {
    outcomes.into_iter().filter(|failed| **failed).count()
}

/// Percentage of `true` outcomes, `None` when there are none.
fn failure_percent<'a, I>(outcomes: I) -> Option<f32>
where
    I: IntoIterator<Item = &'a bool>,
    I::IntoIter: ExactSizeIterator,
{
    let outcomes = outcomes.into_iter();
    let total = outcomes.len();
    if total == 0 {
        return None;
    }
    Some(count_failures(outcomes) as f32 * 100.0 / total as f32)
}

impl ResiliencePolicy for CircuitBreaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute<'a>(&'a self, mut operation: Operation<'a>) -> BoxFuture<'a, Result<String, PolicyError>> {
        Box::pin(async move { self.call(&mut operation) })
    }
}
