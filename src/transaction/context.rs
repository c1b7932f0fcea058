//! Explicit transaction nesting depth.
//!
//! Interceptors are nested when a transactional service calls another one. Only
//! the outermost interceptor owns the transaction, and only it may retry, so each
//! logical operation carries a [`TransactionContext`] that counts how many
//! interceptors are currently inside a transaction. The context also publishes
//! the store handle of the open transaction to the unit of work.

use parking_lot::RwLock;
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type TransactionHandle = Arc<dyn Any + Send + Sync>;

/// Shared nesting counter for one logical business operation
///
/// Clones share the same counter, so a unit of work can capture a clone and
/// pass it to nested interceptor invocations.
#[derive(Clone, Default)]
pub struct TransactionContext {
    depth: Arc<AtomicUsize>,
    transaction: Arc<RwLock<Option<TransactionHandle>>>,
}

impl std::fmt::Debug for TransactionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionContext")
            .field("depth", &self.depth())
            .field("has_transaction", &self.transaction.read().is_some())
            .finish()
    }
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interceptors currently inside a transaction
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Acquire)
    }

    /// True while some enclosing interceptor holds an open transaction
    pub fn is_active(&self) -> bool {
        self.depth() > 0
    }

    /// Store handle of the open transaction, if it is an `H`
    ///
    /// Nested invocations see the handle of the outermost transaction.
    pub fn transaction<H: Any + Send + Sync>(&self) -> Option<Arc<H>> {
        let handle = self.transaction.read().clone()?;
        handle.downcast::<H>().ok()
    }

    pub(crate) fn attach(&self, handle: Option<TransactionHandle>) -> AttachGuard {
        *self.transaction.write() = handle;
        AttachGuard {
            transaction: Arc::clone(&self.transaction),
        }
    }

    pub(crate) fn enter(&self) -> DepthGuard {
        self.depth.fetch_add(1, Ordering::AcqRel);
        DepthGuard {
            depth: Arc::clone(&self.depth),
        }
    }
}

/// Decrements the depth when the attempt unwinds, including on cancellation
#[derive(Debug)]
pub(crate) struct DepthGuard {
    depth: Arc<AtomicUsize>,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Clears the published handle when the attempt ends
pub(crate) struct AttachGuard {
    transaction: Arc<RwLock<Option<TransactionHandle>>>,
}

impl Drop for AttachGuard {
    fn drop(&mut self) {
        self.transaction.write().take();
    }
}
