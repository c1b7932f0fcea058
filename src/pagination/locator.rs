//! Data sources for paginators.

use super::error::PaginationResult;
use super::page::PageRequest;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supplies item slices and total counts for a paginator
#[async_trait]
pub trait PaginatorLocator<T: Send>: Send + Sync {
    /// Load the items of the requested page, ordered by the request's sorting fields
    async fn find_items(&self, page: &PageRequest, object_id: Option<&str>) -> PaginationResult<Vec<T>>;

    /// Total number of items available
    async fn get_total_items(&self, object_id: Option<&str>) -> PaginationResult<u64>;
}

/// A name/value filter applied by searchable locators
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchCriterion {
    pub name: String,
    pub value: String,
}

impl SearchCriterion {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A locator that can additionally filter by search criteria
#[async_trait]
pub trait SearchablePaginatorLocator<T: Send>: Send + Sync {
    async fn find_items(
        &self,
        page: &PageRequest,
        object_id: Option<&str>,
        criteria: &[SearchCriterion],
    ) -> PaginationResult<Vec<T>>;

    async fn get_total_items(
        &self,
        object_id: Option<&str>,
        criteria: &[SearchCriterion],
    ) -> PaginationResult<u64>;
}

/// Presents a searchable locator as a plain one, holding the active criteria
///
/// Share the adapter between the paginator and whatever drives the search form;
/// after [`search`](Self::search) call `Paginator::refresh` or `Paginator::first`.
pub struct SearchablePaginatorLocatorAdapter<T: Send> {
    inner: Arc<dyn SearchablePaginatorLocator<T>>,
    criteria: RwLock<Vec<SearchCriterion>>,
}

impl<T: Send> SearchablePaginatorLocatorAdapter<T> {
    pub fn new(inner: Arc<dyn SearchablePaginatorLocator<T>>) -> Self {
        Self {
            inner,
            criteria: RwLock::new(Vec::new()),
        }
    }

    /// Replace the active criteria; an empty list clears the search
    pub fn search(&self, criteria: Vec<SearchCriterion>) {
        *self.criteria.write() = criteria;
    }

    pub fn criteria(&self) -> Vec<SearchCriterion> {
        self.criteria.read().clone()
    }
}

#[async_trait]
impl<T: Send> PaginatorLocator<T> for SearchablePaginatorLocatorAdapter<T> {
    async fn find_items(&self, page: &PageRequest, object_id: Option<&str>) -> PaginationResult<Vec<T>> {
        let criteria = self.criteria();
        self.inner.find_items(page, object_id, &criteria).await
    }

    async fn get_total_items(&self, object_id: Option<&str>) -> PaginationResult<u64> {
        let criteria = self.criteria();
        self.inner.get_total_items(object_id, &criteria).await
    }
}
