//! In-memory locator for result sets that are already loaded, such as rows
//! edited in a form before they are saved.

use super::error::PaginationResult;
use super::locator::{PaginatorLocator, SearchCriterion, SearchablePaginatorLocator};
use super::page::PageRequest;
use super::sorting::{DirectedSortingField, SortingDirection, SortingField};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;

type FieldComparator<T> = Arc<dyn Fn(&T, &T, &SortingField) -> Ordering + Send + Sync>;
type CriterionMatcher<T> = Arc<dyn Fn(&T, &SearchCriterion) -> bool + Send + Sync>;

/// Serves pages from an owned list of items
///
/// Ordering uses the comparator for each requested field in turn. Without a
/// comparator, items keep insertion order. Without a matcher, search criteria
/// are ignored. The object id is not used.
pub struct InMemoryPaginatorLocator<T> {
    items: RwLock<Vec<T>>,
    comparator: Option<FieldComparator<T>>,
    matcher: Option<CriterionMatcher<T>>,
}

impl<T: Clone + Send + Sync> InMemoryPaginatorLocator<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: RwLock::new(items),
            comparator: None,
            matcher: None,
        }
    }

    pub fn with_comparator<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&T, &T, &SortingField) -> Ordering + Send + Sync + 'static,
    {
        self.comparator = Some(Arc::new(comparator));
        self
    }

    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&T, &SearchCriterion) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    pub fn replace_items(&self, items: Vec<T>) {
        *self.items.write() = items;
    }

    pub fn push(&self, item: T) {
        self.items.write().push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Items matching every criterion, ordered by the sorting fields
    fn select(&self, sorting_fields: &[DirectedSortingField], criteria: &[SearchCriterion]) -> Vec<T> {
        let mut selected: Vec<T> = {
            let items = self.items.read();
            match &self.matcher {
                Some(matcher) => items
                    .iter()
                    .filter(|item| criteria.iter().all(|criterion| matcher(item, criterion)))
                    .cloned()
                    .collect(),
                None => items.clone(),
            }
        };

        if let Some(comparator) = &self.comparator {
            if !sorting_fields.is_empty() {
                selected.sort_by(|a, b| {
                    sorting_fields
                        .iter()
                        .map(|sort| {
                            let ordering = comparator(a, b, &sort.field);
                            match sort.direction {
                                SortingDirection::Ascending => ordering,
                                SortingDirection::Descending => ordering.reverse(),
                            }
                        })
                        .find(|ordering| ordering.is_ne())
                        .unwrap_or(Ordering::Equal)
                });
            }
        }

        selected
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> SearchablePaginatorLocator<T> for InMemoryPaginatorLocator<T> {
    async fn find_items(
        &self,
        page: &PageRequest,
        _object_id: Option<&str>,
        criteria: &[SearchCriterion],
    ) -> PaginationResult<Vec<T>> {
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        Ok(self
            .select(&page.sorting_fields, criteria)
            .into_iter()
            .skip(offset)
            .take(page.page_size as usize)
            .collect())
    }

    async fn get_total_items(
        &self,
        _object_id: Option<&str>,
        criteria: &[SearchCriterion],
    ) -> PaginationResult<u64> {
        let total = match (&self.matcher, criteria.is_empty()) {
            (Some(_), false) => self.select(&[], criteria).len(),
            _ => self.len(),
        };
        Ok(total as u64)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> PaginatorLocator<T> for InMemoryPaginatorLocator<T> {
    async fn find_items(&self, page: &PageRequest, object_id: Option<&str>) -> PaginationResult<Vec<T>> {
        SearchablePaginatorLocator::find_items(self, page, object_id, &[]).await
    }

    async fn get_total_items(&self, object_id: Option<&str>) -> PaginationResult<u64> {
        SearchablePaginatorLocator::get_total_items(self, object_id, &[]).await
    }
}
