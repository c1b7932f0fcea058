mod common;

use commerce_resilience::pagination::{total_pages_for, InMemoryPaginatorLocator, PaginationConfig, Paginator};
use commerce_resilience::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use common::strategies::*;
use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    /// Property: walking first() -> next() until the last page visits every item exactly once, in order
    #[test]
    fn paginator_round_trip_visits_every_item_once(
        items in item_list_strategy(),
        page_size in page_size_strategy(),
    ) {
        let rt = runtime();
        let (visited, boundary_repeats) = rt.block_on(async {
            let locator = Arc::new(InMemoryPaginatorLocator::<String>::new(items.clone()));
            let mut paginator = Paginator::<String>::new(locator, PaginationConfig::new(page_size));

            let mut visited = Vec::new();
            let mut page = paginator.first().await.unwrap().clone();
            visited.extend(page.items().iter().cloned());

            while page.has_next() {
                page = paginator.next().await.unwrap().clone();
                visited.extend(page.items().iter().cloned());
            }

            let repeated = paginator.next().await.unwrap().clone();
            (visited, repeated == page)
        });

        prop_assert_eq!(visited, items);
        prop_assert!(boundary_repeats, "next() on the last page must return the same page");
    }

    /// Property: page indices follow from page number and size, and never exceed the total
    #[test]
    fn page_indices_are_consistent(
        items in item_list_strategy(),
        page_size in page_size_strategy(),
        requested in 0u32..20,
    ) {
        let rt = runtime();
        let total = items.len() as u64;
        let page = rt.block_on(async {
            let locator = Arc::new(InMemoryPaginatorLocator::<String>::new(items));
            let mut paginator = Paginator::<String>::new(locator, PaginationConfig::new(page_size));
            paginator.get_page(requested).await.unwrap().clone()
        });

        prop_assert_eq!(page.total_pages(), total_pages_for(total, page_size));
        if total == 0 {
            prop_assert_eq!(page.page_number(), 1);
            prop_assert_eq!(page.page_start_index(), 0);
            prop_assert_eq!(page.page_end_index(), 0);
        } else {
            let expected_start = u64::from(page.page_number() - 1) * u64::from(page_size) + 1;
            prop_assert!(page.page_number() >= 1 && page.page_number() <= page.total_pages());
            prop_assert_eq!(page.page_start_index(), expected_start);
            prop_assert_eq!(page.page_end_index(), expected_start - 1 + page.items().len() as u64);
            prop_assert!(page.page_end_index() <= total);
        }
    }

    /// Property: a breaker opens exactly when a run of consecutive failures reaches the threshold
    #[test]
    fn breaker_opens_only_on_consecutive_failure_runs(
        outcomes in call_outcomes_strategy(),
        failure_threshold in 1u32..6,
    ) {
        let rt = runtime();
        let (state, expected_open) = rt.block_on(async {
            let breaker = CircuitBreaker::new(
                "search_index",
                CircuitBreakerConfig {
                    failure_threshold,
                    attempt_reset_timeout: Duration::from_secs(3600),
                },
            );

            let mut run = 0u32;
            let mut expected_open = false;
            for success in outcomes {
                if expected_open {
                    break;
                }
                let _ = breaker
                    .call(|| async move { if success { Ok(()) } else { Err("unavailable") } })
                    .await;
                run = if success { 0 } else { run + 1 };
                expected_open = run >= failure_threshold;
            }
            (breaker.state(), expected_open)
        });

        prop_assert_eq!(state == CircuitState::Open, expected_open);
    }
}
