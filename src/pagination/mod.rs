//! # Pagination Module
//!
//! Page-by-page navigation over result sets supplied by a locator.
//!
//! ## Key Components
//!
//! - [`paginator`] - Stateful cursor with first/next/previous/last navigation and clamping
//! - [`page`] - Immutable pages, page requests and pagination configuration
//! - [`locator`] - Data source traits, plus search criteria support
//! - [`memory`] - Locator over an in-memory list
//! - [`factory`] - Registry creating paginators per item type
//!
//! A result set with no items is never queried for items; every navigation
//! then yields an empty page 1.
//!
//! ## Example Usage
//!
//! ```rust
//! use commerce_resilience::pagination::{InMemoryPaginatorLocator, PaginationConfig, Paginator};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), commerce_resilience::pagination::PaginationError> {
//! let locator = Arc::new(InMemoryPaginatorLocator::new(vec!["item1", "item2", "item11"]));
//! let mut paginator = Paginator::<&str>::new(locator, PaginationConfig::new(2));
//!
//! assert_eq!(paginator.first().await?.items(), &["item1", "item2"]);
//! assert_eq!(paginator.next().await?.items(), &["item11"]);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod locator;
pub mod memory;
pub mod page;
pub mod paginator;
pub mod sorting;

pub use error::{PaginationError, PaginationResult};
pub use factory::PaginatorFactory;
pub use locator::{
    PaginatorLocator, SearchCriterion, SearchablePaginatorLocator, SearchablePaginatorLocatorAdapter,
};
pub use memory::InMemoryPaginatorLocator;
pub use page::{total_pages_for, Page, PageRequest, PaginationConfig};
pub use paginator::Paginator;
pub use sorting::{DirectedSortingField, SortingDirection, SortingField};
