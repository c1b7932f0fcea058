use thiserror::Error;

/// Errors from paginators, locators and the paginator factory
#[derive(Debug, Error)]
pub enum PaginationError {
    /// The data source failed to produce items or counts
    #[error("Paginator locator failed: {0}")]
    Locator(String),

    #[error("No paginator locator registered for {type_name}")]
    LocatorNotRegistered { type_name: &'static str },
}

impl PaginationError {
    pub fn locator(error: impl std::fmt::Display) -> Self {
        Self::Locator(error.to_string())
    }
}

pub type PaginationResult<T> = Result<T, PaginationError>;
