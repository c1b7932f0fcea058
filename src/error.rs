//! Crate-level error type.
//!
//! Each module has its own error enum; [`ResilienceError`] unifies them for
//! callers that wire several components together. Circuit breaker rejections stay
//! in `CircuitBreakerError<E>` next to the delegate's own error type.

use crate::config::ConfigurationError;
use crate::pagination::PaginationError;
use crate::transaction::TransactionManagerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResilienceError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Pagination error: {0}")]
    Pagination(#[from] PaginationError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionManagerError),
}

pub type Result<T> = std::result::Result<T, ResilienceError>;
