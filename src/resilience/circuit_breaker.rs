//! # Circuit Breaker Implementation
//!
//! Call-wrapping fault isolation with three states: Closed (normal operation),
//! Open (failing fast) and Half-Open (a single trial call is in flight).
//!
//! A breaker trips after `failure_threshold` consecutive failures. While open it
//! rejects calls without touching the protected dependency; once
//! `attempt_reset_timeout` has elapsed since the last trip, exactly one call is let
//! through as a trial and its outcome decides whether the breaker closes again or
//! re-opens with a fresh timeout window.

use crate::resilience::{CircuitBreakerConfig, CircuitBreakerMetrics};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Name used in log messages for breakers configured without one
pub const ANONYMOUS_BREAKER_NAME: &str = "anonymous";

/// Circuit breaker states representing the current operational mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CircuitState {
    /// Normal operation - all calls are allowed through
    #[default]
    Closed = 0,
    /// Failure mode - all calls fail fast without executing
    Open = 1,
    /// A single trial call is executing to probe the dependency
    HalfOpen = 2,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// Errors returned from a protected call
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Circuit is open, the operation was not invoked
    #[error("Circuit breaker is open for {component}")]
    CircuitOpen { component: String },

    /// The operation itself failed; the original error is carried unchanged
    #[error("Operation failed: {0}")]
    OperationFailed(E),
}

impl<E> CircuitBreakerError<E> {
    /// True when the breaker rejected the call without invoking the operation
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, CircuitBreakerError::CircuitOpen { .. })
    }

    /// The delegate's own error, if the operation ran and failed
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            CircuitBreakerError::OperationFailed(e) => Some(e),
            CircuitBreakerError::CircuitOpen { .. } => None,
        }
    }
}

/// Mutable breaker state, always accessed under the breaker's lock
#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    last_trip: Option<Instant>,
    metrics: CircuitBreakerMetrics,
}

/// Core circuit breaker implementation
///
/// State transitions are serialized under a mutex that is never held across an
/// `.await`, so one breaker can be shared between tasks protecting the same
/// dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    /// Component name for logging and metrics
    name: Option<String>,

    /// Configuration parameters
    config: CircuitBreakerConfig,

    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given name and configuration
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self::build(Some(name.into()), config)
    }

    /// Create a breaker without a name; log messages refer to it as `anonymous`
    pub fn anonymous(config: CircuitBreakerConfig) -> Self {
        Self::build(None, config)
    }

    fn build(name: Option<String>, config: CircuitBreakerConfig) -> Self {
        info!(
            component = name.as_deref().unwrap_or(ANONYMOUS_BREAKER_NAME),
            failure_threshold = config.failure_threshold,
            attempt_reset_timeout_ms = config.attempt_reset_timeout.as_millis() as u64,
            "🛡️ Circuit breaker initialized"
        );

        Self {
            name,
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                last_trip: None,
                metrics: CircuitBreakerMetrics::new(),
            }),
        }
    }

    /// Get current circuit state
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Current run of failures without an intervening success
    pub fn consecutive_failures(&self) -> u32 {
        self.inner.lock().consecutive_failures
    }

    /// Configured component name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name used in log output (`anonymous` when unset)
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(ANONYMOUS_BREAKER_NAME)
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Execute an operation with circuit breaker protection
    ///
    /// The operation is never invoked while the breaker is open. Its own error
    /// is returned as [`CircuitBreakerError::OperationFailed`], including the
    /// failure that trips the breaker.
    pub async fn call<F, T, E, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut permit = self.admit()?;

        let start_time = Instant::now();
        let result = operation().await;
        let duration = start_time.elapsed();

        match &result {
            Ok(_) => permit.record_success(duration),
            Err(_) => permit.record_failure(duration),
        }

        result.map_err(CircuitBreakerError::OperationFailed)
    }

    /// Decide whether a call may proceed, moving Open -> HalfOpen when the
    /// reset timeout has elapsed
    fn admit<E>(&self) -> Result<CallPermit<'_>, CircuitBreakerError<E>> {
        let mut inner = self.inner.lock();
        match inner.state {
            CircuitState::Closed => Ok(CallPermit::new(self, false)),
            CircuitState::Open => {
                let timeout_elapsed = inner
                    .last_trip
                    .map_or(true, |tripped| tripped.elapsed() >= self.config.attempt_reset_timeout);

                if timeout_elapsed {
                    inner.state = CircuitState::HalfOpen;
                    info!(
                        component = %self.display_name(),
                        "🟡 Circuit breaker half-open, admitting trial call"
                    );
                    Ok(CallPermit::new(self, true))
                } else {
                    inner.metrics.rejected_calls += 1;
                    debug!(component = %self.display_name(), "Circuit open, failing fast");
                    Err(CircuitBreakerError::CircuitOpen {
                        component: self.display_name().to_string(),
                    })
                }
            }
            CircuitState::HalfOpen => {
                inner.metrics.rejected_calls += 1;
                debug!(
                    component = %self.display_name(),
                    "Trial call in flight, failing fast"
                );
                Err(CircuitBreakerError::CircuitOpen {
                    component: self.display_name().to_string(),
                })
            }
        }
    }

    fn on_success(&self, trial: bool, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.metrics.total_calls += 1;
        inner.metrics.success_count += 1;
        inner.metrics.total_duration += duration;

        debug!(
            component = %self.display_name(),
            duration_ms = duration.as_millis() as u64,
            "🟢 Operation succeeded"
        );

        match inner.state {
            CircuitState::HalfOpen if trial => {
                inner.consecutive_failures = 0;
                self.transition_to_closed(&mut inner);
            }
            CircuitState::Closed => {
                inner.consecutive_failures = 0;
            }
            // A call admitted before the breaker tripped; it does not close the circuit
            _ => {}
        }
    }

    fn on_failure(&self, trial: bool, duration: Duration) {
        let mut inner = self.inner.lock();
        inner.metrics.total_calls += 1;
        inner.metrics.failure_count += 1;
        inner.metrics.total_duration += duration;

        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                warn!(
                    component = %self.display_name(),
                    consecutive_failures = inner.consecutive_failures,
                    failure_threshold = self.config.failure_threshold,
                    duration_ms = duration.as_millis() as u64,
                    "🔴 Operation failed"
                );
                if inner.consecutive_failures >= self.config.failure_threshold {
                    self.transition_to_open(&mut inner, CircuitState::Closed);
                }
            }
            CircuitState::HalfOpen if trial => {
                inner.consecutive_failures += 1;
                warn!(component = %self.display_name(), "🔴 Trial call failed");
                self.transition_to_open(&mut inner, CircuitState::HalfOpen);
            }
            _ => {
                debug!(
                    component = %self.display_name(),
                    "Failure recorded while circuit already open"
                );
            }
        }
    }

    /// Trial future dropped before completion: hand the trial slot back
    fn on_abandoned_trial(&self) {
        let mut inner = self.inner.lock();
        if inner.state == CircuitState::HalfOpen {
            inner.state = CircuitState::Open;
            debug!(
                component = %self.display_name(),
                "Trial call abandoned, circuit remains open"
            );
        }
    }

    /// `from` is the state named in the transition log
    fn transition_to_open(&self, inner: &mut BreakerState, from: CircuitState) {
        inner.state = CircuitState::Open;
        inner.last_trip = Some(Instant::now());
        inner.metrics.trip_count += 1;
        inner.metrics.last_tripped_at = Some(Utc::now());

        error!(
            component = %self.display_name(),
            consecutive_failures = inner.consecutive_failures,
            failure_threshold = self.config.failure_threshold,
            attempt_reset_timeout_ms = self.config.attempt_reset_timeout.as_millis() as u64,
            "🔴 Circuit breaker '{}' opened (failing fast)",
            self.display_name()
        );
        info!(
            component = %self.display_name(),
            "Circuit breaker '{}' changing state from {} to {}",
            self.display_name(),
            from,
            CircuitState::Open
        );
    }

    fn transition_to_closed(&self, inner: &mut BreakerState) {
        let previous = inner.state;
        inner.state = CircuitState::Closed;
        inner.last_trip = None;

        info!(
            component = %self.display_name(),
            total_calls = inner.metrics.total_calls,
            "🟢 Circuit breaker '{}' changing state from {} to {}",
            self.display_name(),
            previous,
            CircuitState::Closed
        );
    }

    /// Force the breaker open and restart the reset timeout
    ///
    /// Logs the same transition as a threshold trip, whatever the current state.
    pub fn trip(&self) {
        let mut inner = self.inner.lock();
        warn!(component = %self.display_name(), "🚨 Circuit breaker tripped manually");
        self.transition_to_open(&mut inner, CircuitState::Closed);
    }

    /// Force the breaker closed and clear the failure count
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        warn!(component = %self.display_name(), "🚨 Circuit breaker reset manually");
        inner.consecutive_failures = 0;
        self.transition_to_closed(&mut inner);
    }

    /// Get current metrics snapshot
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        let mut snapshot = inner.metrics.clone();
        snapshot.current_state = inner.state;
        snapshot.consecutive_failures = u64::from(inner.consecutive_failures);

        if snapshot.total_calls > 0 {
            snapshot.failure_rate = snapshot.failure_count as f64 / snapshot.total_calls as f64;
            snapshot.success_rate = snapshot.success_count as f64 / snapshot.total_calls as f64;
            snapshot.average_duration = average_duration(snapshot.total_duration, snapshot.total_calls);
        }

        snapshot
    }

    /// Check if circuit is healthy (closed state with low failure rate)
    pub fn is_healthy(&self) -> bool {
        self.metrics().is_healthy()
    }
}

fn average_duration(total: Duration, calls: u64) -> Duration {
    match total.as_nanos().checked_div(u128::from(calls)) {
        Some(nanos) => Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)),
        None => Duration::ZERO,
    }
}

/// Admission ticket for one protected call
///
/// A trial permit that is dropped without an outcome (the caller's future was
/// cancelled) releases the half-open slot so the next caller may probe.
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    trial: bool,
    completed: bool,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, trial: bool) -> Self {
        Self {
            breaker,
            trial,
            completed: false,
        }
    }

    fn record_success(&mut self, duration: Duration) {
        self.completed = true;
        self.breaker.on_success(self.trial, duration);
    }

    fn record_failure(&mut self, duration: Duration) {
        self.completed = true;
        self.breaker.on_failure(self.trial, duration);
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if self.trial && !self.completed {
            self.breaker.on_abandoned_trial();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn config(failure_threshold: u32, timeout_ms: u64) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold,
            attempt_reset_timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[tokio::test]
    async fn test_circuit_breaker_normal_operation() {
        let circuit = CircuitBreaker::new("test", config(3, 100));

        assert_eq!(circuit.state(), CircuitState::Closed);

        let result = circuit.call(|| async { Ok::<_, String>("success") }).await;
        assert_eq!(result.unwrap(), "success");

        let metrics = circuit.metrics();
        assert_eq!(metrics.total_calls, 1);
        assert_eq!(metrics.success_count, 1);
        assert_eq!(metrics.failure_count, 0);
    }

    #[tokio::test]
    async fn test_original_error_is_returned_on_trip() {
        let circuit = CircuitBreaker::new("test", config(1, 1_000));

        let result = circuit.call(|| async { Err::<(), _>("boom") }).await;
        assert_eq!(result.unwrap_err().into_operation_error(), Some("boom"));
        assert_eq!(circuit.state(), CircuitState::Open);
    }

    #[tokio::test]
    async fn test_open_circuit_does_not_invoke_operation() {
        let circuit = CircuitBreaker::new("test", config(1, 60_000));
        let invocations = Arc::new(AtomicUsize::new(0));

        let _ = circuit.call(|| async { Err::<(), _>("boom") }).await;

        let counter = Arc::clone(&invocations);
        let result = circuit
            .call(|| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(())
            })
            .await;

        assert!(result.unwrap_err().is_circuit_open());
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(circuit.metrics().rejected_calls, 1);
    }

    #[tokio::test]
    async fn test_anonymous_breaker_display_name() {
        let circuit = CircuitBreaker::anonymous(config(1, 10));
        assert_eq!(circuit.name(), None);
        assert_eq!(circuit.display_name(), ANONYMOUS_BREAKER_NAME);

        circuit.trip();
        let result = circuit.call(|| async { Ok::<_, String>(()) }).await;
        match result {
            Err(CircuitBreakerError::CircuitOpen { component }) => assert_eq!(component, "anonymous"),
            other => panic!("expected fail-fast, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_trial_releases_half_open_slot() {
        let circuit = CircuitBreaker::new("test", config(1, 50));
        circuit.trip();
        tokio::time::advance(Duration::from_millis(60)).await;

        {
            let trial = circuit.call(|| std::future::pending::<Result<(), String>>());
            tokio::pin!(trial);
            let polled = futures_poll_once(trial.as_mut()).await;
            assert!(polled.is_none());
            assert_eq!(circuit.state(), CircuitState::HalfOpen);
        }

        assert_eq!(circuit.state(), CircuitState::Open);
        let result = circuit.call(|| async { Ok::<_, String>(()) }).await;
        assert!(result.is_ok());
        assert_eq!(circuit.state(), CircuitState::Closed);
    }

    async fn futures_poll_once<F: Future + Unpin>(fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            out = fut => Some(out),
            _ = std::future::ready(()) => None,
        }
    }

    #[tokio::test]
    async fn test_reset_closes_and_clears_failures() {
        let circuit = CircuitBreaker::new("test", config(2, 60_000));
        let _ = circuit.call(|| async { Err::<(), _>("boom") }).await;
        assert_eq!(circuit.consecutive_failures(), 1);

        circuit.trip();
        assert_eq!(circuit.state(), CircuitState::Open);

        circuit.reset();
        assert_eq!(circuit.state(), CircuitState::Closed);
        assert_eq!(circuit.consecutive_failures(), 0);
        assert_eq!(circuit.metrics().trip_count, 1);
    }

    #[test]
    fn test_average_duration_beyond_u32_calls() {
        let calls = u64::from(u32::MAX) + 1;
        assert_eq!(
            average_duration(Duration::from_secs(calls), calls),
            Duration::from_secs(1)
        );
        assert_eq!(average_duration(Duration::from_secs(5), 0), Duration::ZERO);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_manual_trip_logs_closed_to_open_from_any_state() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let circuit = CircuitBreaker::new("inventory", config(1, 60_000));
        tracing::subscriber::with_default(subscriber, || {
            circuit.trip();
            circuit.trip();
        });

        let output = String::from_utf8_lossy(&logs.0.lock()).into_owned();
        assert_eq!(
            output
                .matches("Circuit breaker 'inventory' changing state from CLOSED to OPEN")
                .count(),
            2
        );
        assert_eq!(output.matches("Circuit breaker 'inventory' opened").count(), 2);
        assert!(!output.contains("from OPEN to OPEN"));
    }
}
