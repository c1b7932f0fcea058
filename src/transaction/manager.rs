//! Transaction boundaries used by the deadlock retry interceptor.
//!
//! A [`TransactionManager`] is shared by every caller. Each `begin` hands back an
//! owned [`ActiveTransaction`] for that attempt alone, so independent operations
//! run their transactions side by side.

use async_trait::async_trait;
use std::any::Any;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Underlying cause carried by manager failures
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failures reported by a transaction manager
///
/// The store's own error is kept as the `source()`, so deadlock classification
/// still sees database error codes.
#[derive(Debug, Error)]
pub enum TransactionManagerError {
    #[error("Failed to begin transaction: {0}")]
    Begin(#[source] BoxError),

    #[error("Failed to commit transaction: {0}")]
    Commit(#[source] BoxError),

    #[error("Failed to roll back transaction: {0}")]
    Rollback(#[source] BoxError),

    #[error("No active transaction")]
    NoActiveTransaction,
}

/// Opens one transaction per attempt
#[async_trait]
pub trait TransactionManager: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ActiveTransaction>, TransactionManagerError>;
}

/// An open transaction owned by a single attempt
#[async_trait]
pub trait ActiveTransaction: Send {
    async fn commit(self: Box<Self>) -> Result<(), TransactionManagerError>;

    async fn rollback(self: Box<Self>) -> Result<(), TransactionManagerError>;

    /// Store handle published to the unit of work through its `TransactionContext`
    fn handle(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }
}

#[derive(Debug, Default)]
struct Counters {
    active: AtomicUsize,
    begun: AtomicUsize,
    committed: AtomicUsize,
    rolled_back: AtomicUsize,
}

/// Counting transaction manager without a backing store
///
/// Useful where the unit of work manages its own storage, and for verifying
/// scope handling in tests.
#[derive(Debug, Default)]
pub struct InMemoryTransactionManager {
    counters: Arc<Counters>,
}

impl InMemoryTransactionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions begun and not yet finished
    pub fn active(&self) -> usize {
        self.counters.active.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active() > 0
    }

    pub fn begun(&self) -> usize {
        self.counters.begun.load(Ordering::Acquire)
    }

    pub fn committed(&self) -> usize {
        self.counters.committed.load(Ordering::Acquire)
    }

    pub fn rolled_back(&self) -> usize {
        self.counters.rolled_back.load(Ordering::Acquire)
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    async fn begin(&self) -> Result<Box<dyn ActiveTransaction>, TransactionManagerError> {
        self.counters.begun.fetch_add(1, Ordering::AcqRel);
        self.counters.active.fetch_add(1, Ordering::AcqRel);
        Ok(Box::new(InMemoryTransaction {
            counters: Arc::clone(&self.counters),
        }))
    }
}

#[derive(Debug)]
struct InMemoryTransaction {
    counters: Arc<Counters>,
}

impl InMemoryTransaction {
    fn finish(&self, counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::AcqRel);
        self.counters.active.fetch_sub(1, Ordering::AcqRel);
    }
}

#[async_trait]
impl ActiveTransaction for InMemoryTransaction {
    async fn commit(self: Box<Self>) -> Result<(), TransactionManagerError> {
        self.finish(&self.counters.committed);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), TransactionManagerError> {
        self.finish(&self.counters.rolled_back);
        Ok(())
    }
}
