#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Commerce Resilience
//!
//! Fault-tolerance and result-paging building blocks for commerce services.
//!
//! ## Overview
//!
//! Three independent components that service code wraps around its own work:
//!
//! - **Circuit breakers** stop calling a dependency that keeps failing, and probe
//!   it again with a single trial call once a reset timeout has elapsed.
//! - **Deadlock retry** runs a unit of work inside a transaction and, when the
//!   outermost transaction deadlocks, rolls back, restores the identity of the
//!   entities involved and tries again, up to three times.
//! - **Paginators** walk an ordered, counted result set page by page with
//!   boundary clamping, and never query for items when the set is empty.
//!
//! ## Module Organization
//!
//! - [`resilience`] - Circuit breakers, their registry and metrics
//! - [`transaction`] - Deadlock-aware transactional execution
//! - [`pagination`] - Paginators, pages and locators
//! - [`config`] - Layered YAML/environment configuration
//! - [`logging`] - Structured logging setup
//! - [`system_context`] - Components wired together from one configuration
//! - [`error`] - Crate-level error type
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use commerce_resilience::transaction::InMemoryTransactionManager;
//! use commerce_resilience::SystemContext;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! commerce_resilience::logging::init_structured_logging();
//!
//! let context = SystemContext::new(Arc::new(InMemoryTransactionManager::new()))?;
//! let breaker = context.circuit_breaker_manager.get_circuit_breaker("tax_calculation");
//!
//! let _tax = breaker
//!     .call(|| async { Ok::<u64, std::io::Error>(1250) })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```
//!
//! The `postgres` feature (on by default) adds the SQLx-backed transaction manager.

pub mod config;
pub mod error;
pub mod logging;
pub mod pagination;
pub mod resilience;
pub mod system_context;
pub mod transaction;

pub use config::{ConfigManager, ConfigurationError, ResilienceConfig};
pub use error::{ResilienceError, Result};
pub use pagination::{Page, PaginationConfig, PaginationError, Paginator, PaginatorFactory, PaginatorLocator};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerManager, CircuitState};
pub use system_context::SystemContext;
pub use transaction::{DeadlockRetryInterceptor, Persistable, TransactionContext, TransactionError, TransactionManager};
