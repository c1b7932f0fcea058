//! # Resilience Module
//!
//! Circuit breakers that protect calls to unreliable dependencies such as tax
//! connectors, payment gateways and search back-ends.
//!
//! ## Architecture
//!
//! - **Circuit Breakers**: Isolate a failing dependency by failing fast after repeated errors
//! - **Manager**: Explicit registry handing out one breaker per named component
//! - **Metrics**: Call, failure, rejection and trip counters per breaker
//!
//! ## Usage
//!
//! ```rust,no_run
//! use commerce_resilience::resilience::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CircuitBreakerConfig {
//!     failure_threshold: 3,
//!     attempt_reset_timeout: Duration::from_secs(30),
//! };
//!
//! let circuit_breaker = CircuitBreaker::new("tax_calculation", config);
//!
//! let result = circuit_breaker
//!     .call(|| async { Ok::<&str, std::io::Error>("calculated") })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod circuit_breaker;
pub mod config;
pub mod manager;
pub mod metrics;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerError, CircuitState, ANONYMOUS_BREAKER_NAME};
pub use config::CircuitBreakerConfig;
pub use manager::CircuitBreakerManager;
pub use metrics::{CircuitBreakerMetrics, SystemCircuitBreakerMetrics};
