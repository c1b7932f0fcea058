//! # Circuit Breaker Configuration
//!
//! Runtime configuration for a single breaker. The YAML-facing settings live in
//! [`crate::config::CircuitBreakerSettings`] and convert into this type.

use crate::config::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single circuit breaker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening circuit
    pub failure_threshold: u32,

    /// Time to stay open before admitting a trial call
    pub attempt_reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            attempt_reset_timeout: Duration::from_secs(30),
        }
    }
}

impl CircuitBreakerConfig {
    pub fn new(failure_threshold: u32, attempt_reset_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            attempt_reset_timeout,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.failure_threshold == 0 {
            return Err(ConfigurationError::invalid_value(
                "failure_threshold",
                "0",
                "failure_threshold must be greater than 0",
            ));
        }

        if self.attempt_reset_timeout.is_zero() {
            return Err(ConfigurationError::invalid_value(
                "attempt_reset_timeout",
                "0ms",
                "attempt_reset_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
