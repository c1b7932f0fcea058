//! # Deadlock-Retrying Transaction Interceptor
//!
//! Runs a unit of work inside a fresh transaction and retries it when the store
//! reports a deadlock. Before every retry the identity values of the invocation's
//! persistable arguments are restored to what they were before the failed attempt.
//!
//! Retries happen only in the outermost interceptor of a [`TransactionContext`].
//! Nested invocations join the enclosing transaction and surface every error,
//! leaving the retry decision to the owner of the transaction.

use super::context::TransactionContext;
use super::deadlock::DeadlockDetector;
use super::manager::{TransactionManager, TransactionManagerError};
use super::persistable::{IdentitySnapshot, Persistable};
use crate::config::DeadlockRetryConfig;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by [`DeadlockRetryInterceptor::invoke`]
///
/// A deadlock reported at commit is retried like one raised by the work; when the
/// budget runs out it surfaces as `Manager(Commit(..))`.
#[derive(Debug, Error)]
pub enum TransactionError<E> {
    /// The unit of work failed; the original error is carried unchanged
    #[error("{0}")]
    Operation(E),

    /// The transaction scope itself could not be opened or closed
    #[error(transparent)]
    Manager(#[from] TransactionManagerError),
}

impl<E> TransactionError<E> {
    /// The unit of work's own error, if that is what failed
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            TransactionError::Operation(e) => Some(e),
            TransactionError::Manager(_) => None,
        }
    }
}

/// Wraps units of work in transactions, retrying top-level deadlocks
#[derive(Clone)]
pub struct DeadlockRetryInterceptor {
    manager: Arc<dyn TransactionManager>,
    detector: DeadlockDetector,
    max_attempts: u32,
}

impl std::fmt::Debug for DeadlockRetryInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeadlockRetryInterceptor")
            .field("detector", &self.detector)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl DeadlockRetryInterceptor {
    /// Interceptor with the default policy (3 deadlocks, `"Deadlock"` prefix)
    pub fn new(manager: Arc<dyn TransactionManager>) -> Self {
        Self::from_config(manager, &DeadlockRetryConfig::default())
    }

    pub fn from_config(manager: Arc<dyn TransactionManager>, config: &DeadlockRetryConfig) -> Self {
        Self {
            manager,
            detector: DeadlockDetector::new(config.deadlock_message_prefix.clone()),
            max_attempts: config.max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn detector(&self) -> &DeadlockDetector {
        &self.detector
    }

    /// Run `work` transactionally on behalf of an invocation with persistable `args`
    ///
    /// Stops retrying once `max_attempts` deadlocks have been observed for this
    /// call and returns the last deadlock error.
    pub async fn invoke<F, Fut, T, E>(
        &self,
        ctx: &TransactionContext,
        args: &[&dyn Persistable],
        mut work: F,
    ) -> Result<T, TransactionError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        if ctx.is_active() {
            return self.invoke_nested(ctx, &mut work).await;
        }

        let mut deadlocks = 0u32;
        loop {
            let snapshot = IdentitySnapshot::capture(args);
            debug!(attempt = deadlocks + 1, "Starting transactional attempt");

            let error = match self.run_attempt(ctx, &mut work).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !self.is_deadlock(&error) {
                return Err(error);
            }

            deadlocks += 1;
            if deadlocks >= self.max_attempts {
                crate::log_resilience!(
                    warn,
                    "deadlock_retry_exhausted",
                    deadlocks: deadlocks,
                    max_attempts: self.max_attempts
                );
                return Err(error);
            }

            let restored = snapshot.restore();
            warn!(
                deadlocks,
                max_attempts = self.max_attempts,
                restored_identities = restored,
                error = %error,
                "Deadlock detected, retrying in a fresh transaction"
            );
        }
    }

    /// Deadlocks raised by the work or by the commit count against the same budget
    fn is_deadlock<E>(&self, error: &TransactionError<E>) -> bool
    where
        E: Error + 'static,
    {
        match error {
            TransactionError::Operation(e) => self.detector.is_deadlock(e),
            TransactionError::Manager(e) => self.detector.is_deadlock(e),
        }
    }

    /// One begin/work/commit-or-rollback cycle in its own transaction
    async fn run_attempt<F, Fut, T, E>(
        &self,
        ctx: &TransactionContext,
        work: &mut F,
    ) -> Result<T, TransactionError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let transaction = self.manager.begin().await?;

        let outcome = {
            let _attached = ctx.attach(transaction.handle());
            let _scope = ctx.enter();
            work().await
        };

        match outcome {
            Ok(value) => {
                transaction.commit().await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = transaction.rollback().await {
                    warn!(error = %rollback_error, "Rollback after failed attempt failed");
                }
                Err(TransactionError::Operation(error))
            }
        }
    }

    async fn invoke_nested<F, Fut, T, E>(
        &self,
        ctx: &TransactionContext,
        work: &mut F,
    ) -> Result<T, TransactionError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        let depth = ctx.depth();
        let outcome = {
            let _scope = ctx.enter();
            work().await
        };

        outcome.map_err(|error| {
            if self.detector.is_deadlock(&error) {
                debug!(
                    depth,
                    "Deadlock in nested transaction, deferring to outermost interceptor"
                );
            }
            TransactionError::Operation(error)
        })
    }
}
