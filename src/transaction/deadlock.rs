//! Deadlock detection.
//!
//! A failure counts as a deadlock when any error in its `source()` chain either
//! has a message starting with the configured prefix (`"Deadlock"` by default) or,
//! with the `postgres` feature, is a database error carrying SQLSTATE `40P01`.

use std::error::Error;

/// PostgreSQL SQLSTATE codes relevant to transaction retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PgErrorCode;

impl PgErrorCode {
    /// Deadlock detected - Code 40P01
    ///
    /// Two or more transactions were waiting for each other; one was rolled back.
    pub const DEADLOCK_DETECTED: &'static str = "40P01";

    #[inline]
    pub fn is_deadlock(code: &str) -> bool {
        code == Self::DEADLOCK_DETECTED
    }
}

/// Classifies errors as storage deadlocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlockDetector {
    message_prefix: String,
}

impl Default for DeadlockDetector {
    fn default() -> Self {
        Self::new("Deadlock")
    }
}

impl DeadlockDetector {
    pub fn new(message_prefix: impl Into<String>) -> Self {
        Self {
            message_prefix: message_prefix.into(),
        }
    }

    pub fn message_prefix(&self) -> &str {
        &self.message_prefix
    }

    /// Walk the error and its causes looking for a deadlock
    pub fn is_deadlock(&self, error: &(dyn Error + 'static)) -> bool {
        let mut current = Some(error);
        while let Some(err) = current {
            if err.to_string().starts_with(&self.message_prefix) {
                return true;
            }

            #[cfg(feature = "postgres")]
            if Self::is_database_deadlock(err) {
                return true;
            }

            current = err.source();
        }
        false
    }

    #[cfg(feature = "postgres")]
    fn is_database_deadlock(err: &(dyn Error + 'static)) -> bool {
        match err.downcast_ref::<sqlx::Error>() {
            Some(sqlx::Error::Database(db_error)) => db_error
                .code()
                .as_deref()
                .is_some_and(PgErrorCode::is_deadlock),
            _ => false,
        }
    }
}
