//! Registry of paginator locators keyed by item type.

use super::error::{PaginationError, PaginationResult};
use super::locator::PaginatorLocator;
use super::page::PaginationConfig;
use super::paginator::Paginator;
use crate::config::PaginationDefaults;
use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;
use tracing::debug;

/// Creates paginators for item types whose locator has been registered
///
/// Constructed once and passed to the services that page through results.
#[derive(Debug, Default)]
pub struct PaginatorFactory {
    locators: DashMap<TypeId, Box<dyn Any + Send + Sync>>,
    defaults: PaginationDefaults,
}

impl PaginatorFactory {
    pub fn new(defaults: PaginationDefaults) -> Self {
        Self {
            locators: DashMap::new(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &PaginationDefaults {
        &self.defaults
    }

    /// Register the locator for `T`, replacing any previous one
    pub fn register<T: Send + 'static>(&self, locator: Arc<dyn PaginatorLocator<T>>) {
        debug!(item_type = type_name::<T>(), "Registering paginator locator");
        self.locators.insert(TypeId::of::<T>(), Box::new(locator));
    }

    pub fn is_registered<T: Send + 'static>(&self) -> bool {
        self.locators.contains_key(&TypeId::of::<T>())
    }

    pub fn unregister<T: Send + 'static>(&self) -> bool {
        self.locators.remove(&TypeId::of::<T>()).is_some()
    }

    /// Build a paginator over the registered locator for `T`
    ///
    /// A page size of 0 takes the configured default; larger sizes are capped
    /// at the configured maximum.
    pub fn create_paginator<T: Send + 'static>(
        &self,
        mut config: PaginationConfig,
    ) -> PaginationResult<Paginator<T>> {
        let locator = self
            .locators
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().downcast_ref::<Arc<dyn PaginatorLocator<T>>>().cloned())
            .ok_or(PaginationError::LocatorNotRegistered {
                type_name: type_name::<T>(),
            })?;

        config.page_size = self.defaults.resolve_page_size(config.page_size);
        Ok(Paginator::new(locator, config))
    }
}
