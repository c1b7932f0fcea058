//! # Transaction Module
//!
//! Deadlock-aware transactional execution for service operations.
//!
//! ## Key Components
//!
//! - [`interceptor`] - Runs a unit of work in a transaction, retrying top-level deadlocks
//! - [`context`] - Explicit nesting depth so only the outermost interceptor retries
//! - [`persistable`] - Entity identity access and pre-attempt snapshots
//! - [`deadlock`] - Deadlock classification by message prefix or SQLSTATE
//! - [`manager`] - Per-attempt transaction handles and an in-memory implementation
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let interceptor = DeadlockRetryInterceptor::new(Arc::new(PgTransactionManager::new(pool)));
//! let ctx = TransactionContext::new();
//!
//! let order_id = interceptor
//!     .invoke(&ctx, &[&order], || order_service.persist(&order))
//!     .await?;
//! ```

pub mod context;
pub mod deadlock;
pub mod interceptor;
pub mod manager;
pub mod persistable;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use context::TransactionContext;
pub use deadlock::{DeadlockDetector, PgErrorCode};
pub use interceptor::{DeadlockRetryInterceptor, TransactionError};
pub use manager::{ActiveTransaction, BoxError, InMemoryTransactionManager, TransactionManager, TransactionManagerError};
pub use persistable::{Persistable, UidPk, TRANSIENT_UID_PK};
#[cfg(feature = "postgres")]
pub use postgres::{PgTransactionManager, PgTransactionSlot};
