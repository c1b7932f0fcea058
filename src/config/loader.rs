//! Configuration Loader
//!
//! Environment-aware configuration loading. A base `resilience.yaml` is layered
//! with an optional `resilience.<environment>.yaml` and finally with
//! `RESILIENCE__*` environment variables (`RESILIENCE__DEADLOCK_RETRY__MAX_ATTEMPTS=5`).

use super::error::{ConfigResult, ConfigurationError};
use super::ResilienceConfig;
use config::{Config, Environment, File, FileFormat};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Base name of the configuration files
pub const CONFIG_FILE_STEM: &str = "resilience";

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "RESILIENCE";

/// Loaded, validated configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: ResilienceConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            environment = environment,
            directory = %config_directory.display(),
            "Loading resilience configuration"
        );

        let config = Self::load_and_merge_config(&config_directory, environment)?;
        config.validate()?;

        info!(
            environment = environment,
            circuit_breakers_enabled = config.circuit_breakers.enabled,
            deadlock_max_attempts = config.deadlock_retry.max_attempts,
            default_page_size = config.pagination.default_page_size,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Configuration built purely from defaults, for callers without config files
    pub fn default_config() -> Arc<ConfigManager> {
        warn!("Using default resilience configuration");
        Arc::new(ConfigManager {
            config: ResilienceConfig::default(),
            environment: Self::detect_environment(),
            config_directory: Self::default_config_directory(),
        })
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
    ) -> ConfigResult<ResilienceConfig> {
        let base_path = config_directory.join(format!("{CONFIG_FILE_STEM}.yaml"));
        if !base_path.is_file() {
            return Err(ConfigurationError::ConfigFileNotFound {
                searched_paths: vec![base_path],
            });
        }

        let env_path = config_directory.join(format!("{CONFIG_FILE_STEM}.{environment}.yaml"));
        if env_path.is_file() {
            debug!(path = %env_path.display(), "Applying environment overrides");
        }

        let settings = Config::builder()
            .add_source(File::from(base_path).format(FileFormat::Yaml))
            .add_source(
                File::from(env_path)
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| ConfigurationError::load_failed(environment, e))?;

        settings
            .try_deserialize::<ResilienceConfig>()
            .map_err(|e| ConfigurationError::load_failed(environment, e))
    }

    /// Detect the active environment
    pub fn detect_environment() -> String {
        env::var("RESILIENCE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
    }

    fn default_config_directory() -> PathBuf {
        env::var("RESILIENCE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }
}
