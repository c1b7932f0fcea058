//! # Structured Logging Module
//!
//! Environment-aware console logging using the tracing ecosystem. Output goes to
//! stdout so the host service's log collection picks it up unchanged.
//!
//! - `LOG_LEVEL` or `RUST_LOG` select the filter; otherwise the environment decides
//!   (`debug` for development/test, `info` for production)
//! - `LOG_FORMAT=json` switches to JSON lines
//! - ANSI colors only when stdout is a terminal

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging once per process
///
/// Safe to call repeatedly and alongside a host application that already
/// installed a global subscriber.
pub fn init_console_only() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());
        let json = std::env::var("LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let console_layer = if json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(EnvFilter::new(&log_level))
                .boxed()
        };

        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                log_level = %log_level,
                json_output = json,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Initialize structured logging (alias kept for service bootstrap code)
pub fn init_structured_logging() {
    init_console_only();
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("RESILIENCE_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("RUST_LOG") {
        return level.to_lowercase();
    }

    default_level_for(environment).to_string()
}

fn default_level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

/// Structured log line for resilience components
///
/// ```rust,ignore
/// log_resilience!(warn, "deadlock_retry", attempt: 2, max_attempts: 3);
/// ```
#[macro_export]
macro_rules! log_resilience {
    ($level:ident, $operation:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "RESILIENCE_{}", $operation
        );
    };
    ($level:ident, $operation:expr, $($key:ident: $value:expr),+ $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            $($key = ?$value,)+
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "RESILIENCE_{}", $operation
        );
    };
}
