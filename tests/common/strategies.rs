use proptest::prelude::*;

/// Strategy for generating distinct item names, in order
pub fn item_list_strategy() -> impl Strategy<Value = Vec<String>> {
    (0usize..60).prop_map(|count| (1..=count).map(|i| format!("item{i:03}")).collect())
}

/// Strategy for generating page sizes
pub fn page_size_strategy() -> impl Strategy<Value = u32> {
    1u32..12
}

/// Strategy for generating circuit breaker call outcomes (true = success)
pub fn call_outcomes_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 0..40)
}
