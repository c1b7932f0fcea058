use crate::config::{ConfigManager, ResilienceConfig};
use crate::pagination::PaginatorFactory;
use crate::resilience::CircuitBreakerManager;
use crate::transaction::{DeadlockRetryInterceptor, TransactionManager};
use crate::Result;
use std::sync::Arc;
use tracing::info;

/// Shared resilience components built from one configuration
///
/// Holds the registries that would otherwise be process-wide singletons:
/// - Circuit breaker manager, one breaker per component name
/// - Deadlock retry interceptor bound to a transaction manager
/// - Paginator factory keyed by item type
///
/// Build it once at startup and hand clones of the `Arc`s to services.
pub struct SystemContext {
    pub config_manager: Arc<ConfigManager>,

    pub circuit_breaker_manager: Arc<CircuitBreakerManager>,

    pub deadlock_retry: DeadlockRetryInterceptor,

    pub paginator_factory: Arc<PaginatorFactory>,
}

impl std::fmt::Debug for SystemContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemContext")
            .field("environment", &self.config_manager.environment())
            .field(
                "circuit_breakers",
                &self.circuit_breaker_manager.list_components(),
            )
            .field("deadlock_retry", &self.deadlock_retry)
            .field("paginator_factory", &"Arc<PaginatorFactory>")
            .finish()
    }
}

impl SystemContext {
    /// Load configuration for the detected environment and build the components
    pub fn new(transaction_manager: Arc<dyn TransactionManager>) -> Result<Self> {
        info!("Initializing SystemContext with auto-detected environment configuration");
        let config_manager = ConfigManager::load()?;
        Self::from_config(config_manager, transaction_manager)
    }

    pub fn from_config(
        config_manager: Arc<ConfigManager>,
        transaction_manager: Arc<dyn TransactionManager>,
    ) -> Result<Self> {
        let config: &ResilienceConfig = config_manager.config();
        config.validate()?;

        let circuit_breaker_manager = Arc::new(CircuitBreakerManager::from_config(&config.circuit_breakers));
        let deadlock_retry = DeadlockRetryInterceptor::from_config(transaction_manager, &config.deadlock_retry);
        let paginator_factory = Arc::new(PaginatorFactory::new(config.pagination.clone()));

        info!(
            environment = %config_manager.environment(),
            circuit_breakers_enabled = circuit_breaker_manager.is_enabled(),
            deadlock_max_attempts = deadlock_retry.max_attempts(),
            default_page_size = config.pagination.default_page_size,
            "SystemContext initialized"
        );

        Ok(Self {
            config_manager,
            circuit_breaker_manager,
            deadlock_retry,
            paginator_factory,
        })
    }

    /// Defaults throughout, for tests and embedded use
    pub fn with_defaults(transaction_manager: Arc<dyn TransactionManager>) -> Result<Self> {
        Self::from_config(ConfigManager::default_config(), transaction_manager)
    }

    /// Build with a Postgres-backed transaction manager over `pool`
    #[cfg(feature = "postgres")]
    pub fn from_pool_and_config(pool: sqlx::PgPool, config_manager: Arc<ConfigManager>) -> Result<Self> {
        let transaction_manager = Arc::new(crate::transaction::PgTransactionManager::new(pool));
        Self::from_config(config_manager, transaction_manager)
    }

    pub fn config(&self) -> &ResilienceConfig {
        self.config_manager.config()
    }
}
