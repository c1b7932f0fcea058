//! # Circuit Breaker Manager
//!
//! Registry of named circuit breakers, one per protected dependency. Services
//! receive the manager explicitly instead of looking breakers up globally.

use crate::config::{CircuitBreakerComponentConfig, CircuitBreakerSettings};
use crate::resilience::{CircuitBreaker, CircuitBreakerMetrics, CircuitState, SystemCircuitBreakerMetrics};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Manager for multiple circuit breakers across system components
#[derive(Debug, Clone)]
pub struct CircuitBreakerManager {
    /// Collection of circuit breakers by component name
    circuit_breakers: Arc<DashMap<String, Arc<CircuitBreaker>>>,

    settings: CircuitBreakerSettings,
}

impl CircuitBreakerManager {
    /// Create new circuit breaker manager from configuration
    pub fn from_config(settings: &CircuitBreakerSettings) -> Self {
        info!(
            enabled = settings.enabled,
            component_overrides = settings.component_configs.len(),
            "Initializing circuit breaker manager"
        );

        Self {
            circuit_breakers: Arc::new(DashMap::new()),
            settings: settings.clone(),
        }
    }

    /// Whether breakers are enabled globally; callers bypass protection when false
    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Get or create circuit breaker for a component
    pub fn get_circuit_breaker(&self, component_name: &str) -> Arc<CircuitBreaker> {
        if let Some(breaker) = self.circuit_breakers.get(component_name) {
            return Arc::clone(breaker.value());
        }

        let entry = self
            .circuit_breakers
            .entry(component_name.to_string())
            .or_insert_with(|| {
                let config = self
                    .settings
                    .config_for_component(component_name)
                    .to_resilience_config();
                info!(component = component_name, "Created new circuit breaker");
                Arc::new(CircuitBreaker::new(component_name, config))
            });

        Arc::clone(entry.value())
    }

    /// Get all circuit breaker names
    pub fn list_components(&self) -> Vec<String> {
        self.circuit_breakers
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Get metrics for a specific circuit breaker
    pub fn get_component_metrics(&self, component_name: &str) -> Option<CircuitBreakerMetrics> {
        self.circuit_breakers
            .get(component_name)
            .map(|breaker| breaker.metrics())
    }

    /// Snapshot every registered breaker
    pub fn get_system_metrics(&self) -> SystemCircuitBreakerMetrics {
        SystemCircuitBreakerMetrics::collect(
            self.circuit_breakers
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().metrics())),
        )
    }

    /// Force open all circuit breakers (emergency stop)
    pub fn trip_all(&self) {
        crate::log_resilience!(warn, "trip_all", circuit_breakers: self.circuit_breakers.len());
        for entry in self.circuit_breakers.iter() {
            entry.value().trip();
        }
    }

    /// Force close all circuit breakers (emergency recovery)
    pub fn reset_all(&self) {
        crate::log_resilience!(warn, "reset_all", circuit_breakers: self.circuit_breakers.len());
        for entry in self.circuit_breakers.iter() {
            entry.value().reset();
        }
    }

    /// Remove circuit breaker for a component
    pub fn remove_circuit_breaker(&self, component_name: &str) -> bool {
        let removed = self.circuit_breakers.remove(component_name).is_some();
        if removed {
            info!(
                component = component_name,
                remaining_count = self.circuit_breakers.len(),
                "Removed circuit breaker"
            );
        }
        removed
    }

    /// Get count of circuit breakers by state
    pub fn get_state_summary(&self) -> HashMap<CircuitState, usize> {
        self.get_system_metrics().count_by_state()
    }

    /// Check overall system health based on circuit breaker states
    pub fn system_health_score(&self) -> f64 {
        self.get_system_metrics().health_score()
    }

    /// Update configuration for a component; applies to breakers created afterwards
    pub fn update_component_config(
        &mut self,
        component_name: &str,
        config: CircuitBreakerComponentConfig,
    ) {
        self.settings
            .component_configs
            .insert(component_name.to_string(), config);
        info!(
            component = component_name,
            "Updated circuit breaker configuration (applies to new instances)"
        );
    }
}
