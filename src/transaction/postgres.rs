//! PostgreSQL-backed transaction manager.

use super::context::TransactionContext;
use super::manager::{ActiveTransaction, TransactionManager, TransactionManagerError};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Transaction manager opening one pooled `sqlx` transaction per attempt
///
/// Attempts from concurrent operations each get their own connection. The unit
/// of work reaches its attempt's transaction through the [`TransactionContext`]
/// it was invoked with:
///
/// ```rust,ignore
/// let slot = PgTransactionManager::current(&ctx)?;
/// let mut guard = slot.lock().await;
/// let tx = guard.as_mut().ok_or(TransactionManagerError::NoActiveTransaction)?;
/// sqlx::query("INSERT INTO orders (order_number) VALUES ($1)")
///     .bind(order_number)
///     .execute(&mut **tx)
///     .await?;
/// ```
pub struct PgTransactionManager {
    pool: PgPool,
}

impl std::fmt::Debug for PgTransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransactionManager")
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

impl PgTransactionManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The open transaction of the attempt running under `ctx`
    pub fn current(ctx: &TransactionContext) -> Result<Arc<PgTransactionSlot>, TransactionManagerError> {
        ctx.transaction::<PgTransactionSlot>()
            .ok_or(TransactionManagerError::NoActiveTransaction)
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    async fn begin(&self) -> Result<Box<dyn ActiveTransaction>, TransactionManagerError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TransactionManagerError::Begin(Box::new(e)))?;
        debug!("Began PostgreSQL transaction");
        Ok(Box::new(PgActiveTransaction {
            slot: Arc::new(PgTransactionSlot(Mutex::new(Some(tx)))),
        }))
    }
}

/// Shared slot holding an attempt's `sqlx` transaction until it is finished
pub struct PgTransactionSlot(Mutex<Option<Transaction<'static, Postgres>>>);

impl std::fmt::Debug for PgTransactionSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransactionSlot").finish_non_exhaustive()
    }
}

impl PgTransactionSlot {
    /// `None` once the attempt has committed or rolled back
    pub async fn lock(&self) -> MutexGuard<'_, Option<Transaction<'static, Postgres>>> {
        self.0.lock().await
    }

    async fn take(&self) -> Result<Transaction<'static, Postgres>, TransactionManagerError> {
        self.0
            .lock()
            .await
            .take()
            .ok_or(TransactionManagerError::NoActiveTransaction)
    }
}

struct PgActiveTransaction {
    slot: Arc<PgTransactionSlot>,
}

#[async_trait]
impl ActiveTransaction for PgActiveTransaction {
    async fn commit(self: Box<Self>) -> Result<(), TransactionManagerError> {
        self.slot
            .take()
            .await?
            .commit()
            .await
            .map_err(|e| TransactionManagerError::Commit(Box::new(e)))
    }

    async fn rollback(self: Box<Self>) -> Result<(), TransactionManagerError> {
        self.slot
            .take()
            .await?
            .rollback()
            .await
            .map_err(|e| TransactionManagerError::Rollback(Box::new(e)))
    }

    fn handle(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        let slot: Arc<dyn Any + Send + Sync> = self.slot.clone();
        Some(slot)
    }
}
