//! # Resilience Configuration
//!
//! Typed configuration for the circuit breaker registry, the deadlock retry
//! interceptor and paginator defaults. Values come from YAML files layered per
//! environment (see [`ConfigManager`]); every section falls back to defaults
//! when omitted.
//!
//! ```yaml
//! circuit_breakers:
//!   enabled: true
//!   default_config:
//!     failure_threshold: 5
//!     attempt_reset_timeout_millis: 30000
//!   component_configs:
//!     tax_calculation:
//!       failure_threshold: 3
//!       attempt_reset_timeout_millis: 10000
//! deadlock_retry:
//!   max_attempts: 3
//!   deadlock_message_prefix: "Deadlock"
//! pagination:
//!   default_page_size: 20
//!   max_page_size: 1000
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root configuration structure mirroring resilience.yaml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Circuit breaker registry configuration
    pub circuit_breakers: CircuitBreakerSettings,

    /// Deadlock retry interceptor configuration
    pub deadlock_retry: DeadlockRetryConfig,

    /// Paginator defaults
    pub pagination: PaginationDefaults,
}

impl ResilienceConfig {
    /// Validate every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.circuit_breakers.validate()?;
        self.deadlock_retry.validate()?;
        self.pagination.validate()?;
        Ok(())
    }
}

/// Circuit breaker registry configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerSettings {
    /// Whether circuit breakers are enabled globally
    pub enabled: bool,

    /// Default configuration for new circuit breakers
    pub default_config: CircuitBreakerComponentConfig,

    /// Specific configurations for named components
    pub component_configs: HashMap<String, CircuitBreakerComponentConfig>,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_config: CircuitBreakerComponentConfig::default(),
            component_configs: HashMap::new(),
        }
    }
}

impl CircuitBreakerSettings {
    /// Get configuration for a specific component
    pub fn config_for_component(&self, component_name: &str) -> CircuitBreakerComponentConfig {
        self.component_configs
            .get(component_name)
            .cloned()
            .unwrap_or_else(|| self.default_config.clone())
    }

    fn validate(&self) -> ConfigResult<()> {
        self.default_config.to_resilience_config().validate()?;
        for config in self.component_configs.values() {
            config.to_resilience_config().validate()?;
        }
        Ok(())
    }
}

/// Circuit breaker configuration for a specific component from YAML
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CircuitBreakerComponentConfig {
    /// Number of consecutive failures before opening circuit
    pub failure_threshold: u32,

    /// Time to stay open before admitting a trial call (in milliseconds)
    pub attempt_reset_timeout_millis: u64,
}

impl Default for CircuitBreakerComponentConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            attempt_reset_timeout_millis: 30_000,
        }
    }
}

impl CircuitBreakerComponentConfig {
    /// Convert to resilience module's format
    pub fn to_resilience_config(&self) -> crate::resilience::CircuitBreakerConfig {
        crate::resilience::CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            attempt_reset_timeout: Duration::from_millis(self.attempt_reset_timeout_millis),
        }
    }
}

/// Deadlock retry interceptor configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeadlockRetryConfig {
    /// Deadlocks observed for one invocation before giving up
    pub max_attempts: u32,

    /// Error message prefix identifying a storage deadlock
    pub deadlock_message_prefix: String,
}

impl Default for DeadlockRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            deadlock_message_prefix: "Deadlock".to_string(),
        }
    }
}

impl DeadlockRetryConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_attempts == 0 {
            return Err(ConfigurationError::invalid_value(
                "deadlock_retry.max_attempts",
                "0",
                "at least one attempt is required",
            ));
        }
        if self.deadlock_message_prefix.is_empty() {
            return Err(ConfigurationError::MissingRequiredField {
                field: "deadlock_message_prefix".to_string(),
                context: "deadlock_retry".to_string(),
            });
        }
        Ok(())
    }
}

/// Paginator defaults applied by the paginator factory
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PaginationDefaults {
    /// Page size used when a request does not specify one
    pub default_page_size: u32,

    /// Upper bound for requested page sizes
    pub max_page_size: u32,
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 1000,
        }
    }
}

impl PaginationDefaults {
    /// Resolve a requested page size: 0 means "use the default", larger than max is capped
    pub fn resolve_page_size(&self, requested: u32) -> u32 {
        match requested {
            0 => self.default_page_size,
            size => size.min(self.max_page_size),
        }
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.default_page_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "pagination.default_page_size",
                "0",
                "page size must be positive",
            ));
        }
        if self.max_page_size < self.default_page_size {
            return Err(ConfigurationError::invalid_value(
                "pagination.max_page_size",
                self.max_page_size.to_string(),
                format!(
                    "must not be smaller than default_page_size ({})",
                    self.default_page_size
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(ResilienceConfig::default().validate().is_ok());
    }

    #[test]
    fn test_component_fallback_to_default() {
        let settings = CircuitBreakerSettings::default();
        assert_eq!(
            settings.config_for_component("unknown"),
            CircuitBreakerComponentConfig::default()
        );
    }

    #[test]
    fn test_invalid_component_config_rejected() {
        let mut config = ResilienceConfig::default();
        config.circuit_breakers.component_configs.insert(
            "tax".to_string(),
            CircuitBreakerComponentConfig {
                failure_threshold: 0,
                attempt_reset_timeout_millis: 10,
            },
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_page_size() {
        let defaults = PaginationDefaults::default();
        assert_eq!(defaults.resolve_page_size(0), 20);
        assert_eq!(defaults.resolve_page_size(50), 50);
        assert_eq!(defaults.resolve_page_size(5000), 1000);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let json = serde_json::json!({ "deadlock_retry": { "max_attempts": 5 } });
        let config: ResilienceConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.deadlock_retry.max_attempts, 5);
        assert_eq!(config.deadlock_retry.deadlock_message_prefix, "Deadlock");
        assert!(config.circuit_breakers.enabled);
    }
}
