//! Stateful page cursor over a locator-backed result set.
//!
//! A [`Paginator`] is owned by a single request or session. Navigation takes
//! `&mut self`, so sharing one across tasks needs an outer lock.

use super::error::PaginationResult;
use super::locator::PaginatorLocator;
use super::page::{total_pages_for, Page, PageRequest, PaginationConfig};
use super::sorting::DirectedSortingField;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct Paginator<T: Send> {
    locator: Arc<dyn PaginatorLocator<T>>,
    config: PaginationConfig,
    page_number: u32,
    current_page: Option<Page<T>>,
    total_items: Option<u64>,
}

impl<T: Send> fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("config", &self.config)
            .field("page_number", &self.page_number)
            .field("total_items", &self.total_items)
            .finish_non_exhaustive()
    }
}

impl<T: Send> Paginator<T> {
    pub fn new(locator: Arc<dyn PaginatorLocator<T>>, config: PaginationConfig) -> Self {
        let mut paginator = Self {
            locator,
            config: PaginationConfig::default(),
            page_number: 1,
            current_page: None,
            total_items: None,
        };
        paginator.init(config);
        paginator
    }

    /// Apply a new configuration, rewinding to page 1 and dropping cached totals
    pub fn init(&mut self, mut config: PaginationConfig) {
        if config.page_size == 0 {
            warn!("Paginator configured with page size 0, using 1");
            config.page_size = 1;
        }

        self.config = config;
        self.page_number = 1;
        self.current_page = None;
        self.total_items = None;
    }

    /// Swap the data source; cached totals belong to the old one
    pub fn set_locator(&mut self, locator: Arc<dyn PaginatorLocator<T>>) {
        self.locator = locator;
        self.total_items = None;
        self.current_page = None;
    }

    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// The page produced by the most recent navigation, if any
    pub fn current_page(&self) -> Option<&Page<T>> {
        self.current_page.as_ref()
    }

    /// Total items reported by the locator, cached until `init` or `refresh`
    pub async fn total_items(&mut self) -> PaginationResult<u64> {
        if let Some(total) = self.total_items {
            return Ok(total);
        }

        let total = self
            .locator
            .get_total_items(self.config.object_id.as_deref())
            .await?;
        self.total_items = Some(total);
        Ok(total)
    }

    pub async fn total_pages(&mut self) -> PaginationResult<u32> {
        let total = self.total_items().await?;
        Ok(total_pages_for(total, self.config.page_size))
    }

    pub async fn first(&mut self) -> PaginationResult<&Page<T>> {
        self.go_to(1).await
    }

    pub async fn last(&mut self) -> PaginationResult<&Page<T>> {
        let last = self.total_pages().await?;
        self.go_to(last).await
    }

    /// Advance one page; on the last page this rebuilds the same page
    pub async fn next(&mut self) -> PaginationResult<&Page<T>> {
        let target = self.page_number.saturating_add(1);
        self.go_to(target).await
    }

    pub async fn previous(&mut self) -> PaginationResult<&Page<T>> {
        let target = self.page_number.saturating_sub(1);
        self.go_to(target).await
    }

    /// Jump to `page_number`, clamped into the available pages
    pub async fn get_page(&mut self, page_number: u32) -> PaginationResult<&Page<T>> {
        self.go_to(page_number).await
    }

    /// Re-read totals from the locator and rebuild the current page
    ///
    /// Use after the underlying data changed, e.g. rows were deleted so the
    /// cursor may now sit past the end.
    pub async fn refresh(&mut self) -> PaginationResult<&Page<T>> {
        self.total_items = None;
        let last = self.total_pages().await?;
        self.limit_to_last_page(last);
        self.go_to(self.page_number).await
    }

    /// Reorder by `sorting_fields`, keeping page size and object id, and return page 1
    pub async fn sort_by(&mut self, sorting_fields: Vec<DirectedSortingField>) -> PaginationResult<&Page<T>> {
        let config = self.config.clone().with_sorting_fields(sorting_fields);
        self.init(config);
        self.go_to(1).await
    }

    /// Pull the cursor back to `last_page_number` if it is beyond it
    pub fn limit_to_last_page(&mut self, last_page_number: u32) {
        self.page_number = self.page_number.min(last_page_number).max(1);
    }

    async fn go_to(&mut self, requested: u32) -> PaginationResult<&Page<T>> {
        let total_items = self.total_items().await?;

        let page = if total_items == 0 {
            // No data: never ask the locator for items
            self.page_number = 1;
            Page::empty(self.config.page_size, self.config.sorting_fields.clone())
        } else {
            let total_pages = total_pages_for(total_items, self.config.page_size);
            let page_number = requested.clamp(1, total_pages);
            self.page_number = page_number;

            let mut request = PageRequest::new(
                page_number,
                self.config.page_size,
                self.config.sorting_fields.clone(),
            );
            request.load_tuner_hint = self.config.load_tuner_hint.clone();

            let items = self
                .locator
                .find_items(&request, self.config.object_id.as_deref())
                .await?;

            debug!(
                page_number = page_number,
                page_size = request.page_size,
                item_count = items.len(),
                total_items = total_items,
                "Loaded page"
            );

            Page::from_request(request, items, total_items, total_pages)
        };

        Ok(self.current_page.insert(page))
    }
}
