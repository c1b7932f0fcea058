//! Integration tests for circuit breaker state transitions

mod common;

use commerce_resilience::config::{CircuitBreakerComponentConfig, CircuitBreakerSettings};
use commerce_resilience::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerManager, CircuitState,
};
use common::{init_test_logging, DependencyError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn breaker(failure_threshold: u32, reset_timeout_ms: u64) -> CircuitBreaker {
    CircuitBreaker::new(
        "tax_calculation",
        CircuitBreakerConfig {
            failure_threshold,
            attempt_reset_timeout: Duration::from_millis(reset_timeout_ms),
        },
    )
}

async fn fail(breaker: &CircuitBreaker) -> Result<(), CircuitBreakerError<DependencyError>> {
    breaker.call(|| async { Err(DependencyError::Unavailable) }).await
}

async fn succeed(breaker: &CircuitBreaker) -> Result<&'static str, CircuitBreakerError<DependencyError>> {
    breaker.call(|| async { Ok("12.50") }).await
}

#[tokio::test]
async fn test_trips_after_exactly_threshold_consecutive_failures() {
    init_test_logging();
    let breaker = breaker(3, 60_000);

    for expected_failures in 1..3 {
        let err = fail(&breaker).await.unwrap_err();
        assert_eq!(err.into_operation_error(), Some(DependencyError::Unavailable));
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.consecutive_failures(), expected_failures);
    }

    // The tripping failure still surfaces the dependency's own error
    let err = fail(&breaker).await.unwrap_err();
    assert!(!err.is_circuit_open());
    assert_eq!(breaker.state(), CircuitState::Open);

    let err = succeed(&breaker).await.unwrap_err();
    assert!(err.is_circuit_open());
}

#[tokio::test]
async fn test_interleaved_successes_never_trip() {
    let breaker = breaker(2, 60_000);

    fail(&breaker).await.unwrap_err();
    succeed(&breaker).await.unwrap();
    fail(&breaker).await.unwrap_err();
    succeed(&breaker).await.unwrap();

    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);
    assert_eq!(breaker.metrics().trip_count, 0);
}

#[tokio::test]
async fn test_threshold_of_one_trips_on_first_failure() {
    let breaker = breaker(1, 60_000);

    fail(&breaker).await.unwrap_err();
    assert_eq!(breaker.state(), CircuitState::Open);
    assert_eq!(breaker.metrics().trip_count, 1);
}

#[tokio::test]
async fn test_open_breaker_never_invokes_delegate() {
    let breaker = breaker(1, 60_000);
    let invocations = Arc::new(AtomicUsize::new(0));

    fail(&breaker).await.unwrap_err();

    for _ in 0..5 {
        let counter = Arc::clone(&invocations);
        let result = breaker
            .call(|| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, DependencyError>(())
            })
            .await;

        match result {
            Err(CircuitBreakerError::CircuitOpen { component }) => {
                assert_eq!(component, "tax_calculation");
            }
            other => panic!("expected circuit open, got {other:?}"),
        }
    }

    assert_eq!(invocations.load(Ordering::SeqCst), 0);
    assert_eq!(breaker.metrics().rejected_calls, 5);
}

#[tokio::test(start_paused = true)]
async fn test_successful_trial_after_timeout_closes() {
    let breaker = breaker(2, 1_000);

    fail(&breaker).await.unwrap_err();
    fail(&breaker).await.unwrap_err();
    assert_eq!(breaker.state(), CircuitState::Open);

    tokio::time::advance(Duration::from_millis(999)).await;
    assert!(succeed(&breaker).await.unwrap_err().is_circuit_open());

    tokio::time::advance(Duration::from_millis(1)).await;
    assert_eq!(succeed(&breaker).await.unwrap(), "12.50");
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.consecutive_failures(), 0);

    // Fully closed again: a single failure does not re-trip at threshold 2
    fail(&breaker).await.unwrap_err();
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test(start_paused = true)]
async fn test_failed_trial_reopens_with_fresh_window() {
    let breaker = breaker(3, 1_000);
    breaker.trip();

    tokio::time::advance(Duration::from_millis(1_000)).await;
    let err = fail(&breaker).await.unwrap_err();
    assert!(!err.is_circuit_open());
    assert_eq!(breaker.state(), CircuitState::Open);

    // The timeout restarts from the failed trial
    tokio::time::advance(Duration::from_millis(500)).await;
    assert!(succeed(&breaker).await.unwrap_err().is_circuit_open());

    tokio::time::advance(Duration::from_millis(500)).await;
    succeed(&breaker).await.unwrap();
    assert_eq!(breaker.state(), CircuitState::Closed);
    assert_eq!(breaker.metrics().trip_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_fail_fast_during_trial() {
    let breaker = Arc::new(breaker(1, 100));
    breaker.trip();
    tokio::time::advance(Duration::from_millis(100)).await;

    let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
    let trial_breaker = Arc::clone(&breaker);
    let trial = tokio::spawn(async move {
        trial_breaker
            .call(|| async move {
                let _ = release_rx.await;
                Ok::<_, DependencyError>("trial")
            })
            .await
    });

    // Let the trial start and park on the channel
    tokio::task::yield_now().await;
    assert_eq!(breaker.state(), CircuitState::HalfOpen);
    assert!(succeed(&breaker).await.unwrap_err().is_circuit_open());

    release_tx.send(()).unwrap();
    assert_eq!(trial.await.unwrap().unwrap(), "trial");
    assert_eq!(breaker.state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_manager_shares_breakers_per_component() {
    let mut component_configs = HashMap::new();
    component_configs.insert(
        "payment_gateway".to_string(),
        CircuitBreakerComponentConfig {
            failure_threshold: 1,
            attempt_reset_timeout_millis: 60_000,
        },
    );
    let manager = CircuitBreakerManager::from_config(&CircuitBreakerSettings {
        enabled: true,
        component_configs,
        ..CircuitBreakerSettings::default()
    });

    let payments = manager.get_circuit_breaker("payment_gateway");
    fail(&payments).await.unwrap_err();

    let same = manager.get_circuit_breaker("payment_gateway");
    assert_eq!(same.state(), CircuitState::Open);

    let search = manager.get_circuit_breaker("search_index");
    assert_eq!(search.config().failure_threshold, 5);
    assert_eq!(search.state(), CircuitState::Closed);

    let summary = manager.get_state_summary();
    assert_eq!(summary.get(&CircuitState::Open), Some(&1));
    assert_eq!(summary.get(&CircuitState::Closed), Some(&1));

    manager.reset_all();
    assert_eq!(payments.state(), CircuitState::Closed);
}
