#![allow(dead_code)]

pub mod builders;
pub mod mock_locator;
pub mod strategies;

pub use builders::*;
pub use mock_locator::*;
pub use strategies::*;

use tracing::Level;

/// Install a test-writer subscriber once; later calls are no-ops
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
