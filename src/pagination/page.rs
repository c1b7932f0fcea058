//! Pages, page requests and pagination configuration.

use super::sorting::DirectedSortingField;
use serde::{Deserialize, Serialize};

/// Number of pages needed for `total_items` at `page_size` items per page
pub fn total_pages_for(total_items: u64, page_size: u32) -> u32 {
    let page_size = u64::from(page_size.max(1));
    let pages = total_items.div_ceil(page_size);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// How a paginator should slice and order a result set
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub sorting_fields: Vec<DirectedSortingField>,
    /// Identifier of the object whose children are being paged (e.g. a coupon config)
    pub object_id: Option<String>,
    /// Opaque hint passed through to locators that tune how items are loaded
    pub load_tuner_hint: Option<String>,
}

impl PaginationConfig {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn with_sorting_fields(mut self, sorting_fields: Vec<DirectedSortingField>) -> Self {
        self.sorting_fields = sorting_fields;
        self
    }

    pub fn with_object_id(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }

    pub fn with_load_tuner_hint(mut self, hint: impl Into<String>) -> Self {
        self.load_tuner_hint = Some(hint.into());
        self
    }
}

/// The slice of a result set a locator is asked to load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
    pub sorting_fields: Vec<DirectedSortingField>,
    pub load_tuner_hint: Option<String>,
}

impl PageRequest {
    pub fn new(page_number: u32, page_size: u32, sorting_fields: Vec<DirectedSortingField>) -> Self {
        Self {
            page_number,
            page_size,
            sorting_fields,
            load_tuner_hint: None,
        }
    }

    /// Zero-based offset of the first item
    pub fn offset(&self) -> u64 {
        u64::from(self.page_number.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// One-based overall index of the first item on this page
    pub fn start_index(&self) -> u64 {
        self.offset() + 1
    }

    /// `ORDER BY` clause for SQL-backed locators; empty without sorting fields
    ///
    /// Field names are emitted as quoted identifiers.
    pub fn order_by_sql(&self) -> String {
        if self.sorting_fields.is_empty() {
            return String::new();
        }

        let fields: Vec<String> = self
            .sorting_fields
            .iter()
            .map(|sorting| format!("{} {}", sorting.field.quoted_identifier(), sorting.direction.as_sql()))
            .collect();
        format!(" ORDER BY {}", fields.join(", "))
    }

    /// `LIMIT`/`OFFSET` clause for SQL-backed locators
    pub fn to_sql(&self) -> String {
        format!(" LIMIT {} OFFSET {}", self.page_size, self.offset())
    }
}

/// One page of a result set, as produced by a paginator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    items: Vec<T>,
    page_number: u32,
    page_size: u32,
    sorting_fields: Vec<DirectedSortingField>,
    page_start_index: u64,
    page_end_index: u64,
    total_items: u64,
    total_pages: u32,
}

impl<T> Page<T> {
    /// Page 1 of an empty result set
    pub fn empty(page_size: u32, sorting_fields: Vec<DirectedSortingField>) -> Self {
        Self {
            items: Vec::new(),
            page_number: 1,
            page_size,
            sorting_fields,
            page_start_index: 0,
            page_end_index: 0,
            total_items: 0,
            total_pages: 0,
        }
    }

    /// Build a loaded page; indices follow from the request and the item count
    pub fn from_request(request: PageRequest, items: Vec<T>, total_items: u64, total_pages: u32) -> Self {
        if total_items == 0 || request.page_number == 0 {
            let mut page = Self::empty(request.page_size, request.sorting_fields);
            page.items = items;
            return page;
        }

        let page_start_index = request.start_index();
        let shown = items.len().min(request.page_size as usize) as u64;
        let page_end_index = page_start_index - 1 + shown;

        Self {
            items,
            page_number: request.page_number,
            page_size: request.page_size,
            sorting_fields: request.sorting_fields,
            page_start_index,
            page_end_index,
            total_items,
            total_pages,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sorting_fields(&self) -> &[DirectedSortingField] {
        &self.sorting_fields
    }

    /// One-based overall index of the first item (0 when there are no items)
    pub fn page_start_index(&self) -> u64 {
        self.page_start_index
    }

    /// One-based overall index of the last item (0 when there are no items)
    pub fn page_end_index(&self) -> u64 {
        self.page_end_index
    }

    /// Total items in the result set when this page was built
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.page_number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_number > 1
    }
}
