use async_trait::async_trait;
use commerce_resilience::pagination::{PageRequest, PaginationResult, PaginatorLocator};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Locator over fixed string items that records every request it serves
#[derive(Debug, Default)]
pub struct RecordingLocator {
    items: Vec<String>,
    requests: Mutex<Vec<PageRequest>>,
    object_ids: Mutex<Vec<Option<String>>>,
    total_calls: AtomicUsize,
}

impl RecordingLocator {
    pub fn new(items: &[&str]) -> Self {
        Self::from_items(items.iter().map(|s| s.to_string()).collect())
    }

    pub fn from_items(items: Vec<String>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().clone()
    }

    pub fn find_calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn object_ids(&self) -> Vec<Option<String>> {
        self.object_ids.lock().clone()
    }
}

#[async_trait]
impl PaginatorLocator<String> for RecordingLocator {
    async fn find_items(&self, page: &PageRequest, object_id: Option<&str>) -> PaginationResult<Vec<String>> {
        self.requests.lock().push(page.clone());
        self.object_ids.lock().push(object_id.map(str::to_string));

        Ok(self
            .items
            .iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .cloned()
            .collect())
    }

    async fn get_total_items(&self, _object_id: Option<&str>) -> PaginationResult<u64> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.len() as u64)
    }
}

/// Locator reporting no items; loading items from it is a test failure
#[derive(Debug, Default)]
pub struct ZeroDataLocator;

#[async_trait]
impl PaginatorLocator<String> for ZeroDataLocator {
    async fn find_items(&self, _page: &PageRequest, _object_id: Option<&str>) -> PaginationResult<Vec<String>> {
        panic!("find_items called on a locator with zero items");
    }

    async fn get_total_items(&self, _object_id: Option<&str>) -> PaginationResult<u64> {
        Ok(0)
    }
}
