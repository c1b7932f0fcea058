//! # Circuit Breaker Metrics
//!
//! Snapshots of circuit breaker activity for health reporting and diagnostics.

use crate::resilience::CircuitState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Calls below this count are too few to judge a breaker unhealthy
const MIN_CALLS_FOR_HEALTH: u64 = 10;

/// Counters and derived rates for one breaker
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CircuitBreakerMetrics {
    /// Number of calls that reached the protected operation
    pub total_calls: u64,

    /// Number of successful calls
    pub success_count: u64,

    /// Number of failed calls
    pub failure_count: u64,

    /// Calls rejected without invoking the operation
    pub rejected_calls: u64,

    /// Current consecutive failure count
    pub consecutive_failures: u64,

    /// Number of times the breaker has entered the open state
    pub trip_count: u64,

    /// Wall-clock time of the most recent trip
    pub last_tripped_at: Option<DateTime<Utc>>,

    /// Total duration of all operations
    pub total_duration: Duration,

    /// Current circuit breaker state
    pub current_state: CircuitState,

    /// Calculated failure rate (0.0 to 1.0)
    pub failure_rate: f64,

    /// Calculated success rate (0.0 to 1.0)
    pub success_rate: f64,

    /// Average operation duration
    pub average_duration: Duration,
}

impl CircuitBreakerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed with a failure rate under 10%; too few calls count as healthy
    pub fn is_healthy(&self) -> bool {
        match self.current_state {
            CircuitState::Closed => {
                self.total_calls < MIN_CALLS_FOR_HEALTH || self.failure_rate < 0.1
            }
            CircuitState::Open => false,
            CircuitState::HalfOpen => true,
        }
    }

    pub fn state_description(&self) -> &'static str {
        match self.current_state {
            CircuitState::Closed => "Healthy - Normal operation",
            CircuitState::Open => "Failing - Rejecting all calls",
            CircuitState::HalfOpen => "Recovering - Trial call in flight",
        }
    }

    /// One-line summary for log output
    pub fn format_summary(&self) -> String {
        format!(
            "State: {} | Calls: {} | Success: {:.1}% | Failures: {} | Rejected: {} | Trips: {}",
            self.state_description(),
            self.total_calls,
            self.success_rate * 100.0,
            self.failure_count,
            self.rejected_calls,
            self.trip_count
        )
    }
}

/// Point-in-time view over every breaker a manager holds, keyed by component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemCircuitBreakerMetrics {
    pub circuit_breakers: BTreeMap<String, CircuitBreakerMetrics>,
    pub collected_at: DateTime<Utc>,
}

impl SystemCircuitBreakerMetrics {
    /// Collect from `(component, metrics)` pairs
    pub fn collect<I>(components: I) -> Self
    where
        I: IntoIterator<Item = (String, CircuitBreakerMetrics)>,
    {
        Self {
            circuit_breakers: components.into_iter().collect(),
            collected_at: Utc::now(),
        }
    }

    pub fn count_by_state(&self) -> HashMap<CircuitState, usize> {
        self.circuit_breakers
            .values()
            .fold(HashMap::new(), |mut counts, metrics| {
                *counts.entry(metrics.current_state).or_insert(0) += 1;
                counts
            })
    }

    /// Components whose breaker is open or failing too often, in name order
    pub fn unhealthy_components(&self) -> Vec<&str> {
        self.circuit_breakers
            .iter()
            .filter(|(_, metrics)| !metrics.is_healthy())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Share of healthy breakers (1.0 with no breakers)
    pub fn health_score(&self) -> f64 {
        let total = self.circuit_breakers.len();
        if total == 0 {
            return 1.0;
        }
        let unhealthy = self.unhealthy_components().len();
        (total - unhealthy) as f64 / total as f64
    }

    pub fn total_calls(&self) -> u64 {
        self.circuit_breakers.values().map(|m| m.total_calls).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.circuit_breakers.values().map(|m| m.failure_count).sum()
    }

    pub fn total_rejected_calls(&self) -> u64 {
        self.circuit_breakers.values().map(|m| m.rejected_calls).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics_in(state: CircuitState, total: u64, failures: u64) -> CircuitBreakerMetrics {
        CircuitBreakerMetrics {
            current_state: state,
            total_calls: total,
            failure_count: failures,
            failure_rate: if total > 0 { failures as f64 / total as f64 } else { 0.0 },
            ..CircuitBreakerMetrics::new()
        }
    }

    #[test]
    fn test_health_requires_enough_calls() {
        assert!(metrics_in(CircuitState::Closed, 4, 3).is_healthy());
        assert!(!metrics_in(CircuitState::Closed, 20, 10).is_healthy());
        assert!(!metrics_in(CircuitState::Open, 0, 0).is_healthy());
    }

    #[test]
    fn test_system_health_score() {
        assert_eq!(SystemCircuitBreakerMetrics::collect(Vec::new()).health_score(), 1.0);

        let system = SystemCircuitBreakerMetrics::collect(vec![
            ("tax".to_string(), metrics_in(CircuitState::Open, 5, 5)),
            ("catalog".to_string(), metrics_in(CircuitState::Closed, 1, 0)),
        ]);

        assert_eq!(system.health_score(), 0.5);
        assert_eq!(system.total_calls(), 6);
        assert_eq!(system.total_failures(), 5);
        assert_eq!(system.unhealthy_components(), vec!["tax"]);
        assert_eq!(system.count_by_state().get(&CircuitState::Open), Some(&1));
    }
}
