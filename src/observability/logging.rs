//! # Structured Logging
//!
//! Subscriber setup and span macros for the tracing ecosystem.
//!
//! `LISTENER_LOG_LEVEL` is the default directive; `RUST_LOG` wins when set so
//! single modules can be turned up without touching the service config.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{Config, ObservabilityConfig};

/// Create a tracing span for request tracking.
///
/// The `order_id` field stays empty until a handler records it:
///
/// ```rust,ignore
/// let span = request_span!("GET", "/listener-service/api/v1/github/rdf/7");
/// span.record("order_id", 7);
/// ```
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            order_id = tracing::field::Empty
        )
    };
    ($method:expr, $path:expr, $($field:tt)*) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            request_id = %uuid::Uuid::new_v4(),
            order_id = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Create a tracing span for database operations.
///
/// ```rust,ignore
/// let span = db_span!("apply_migration", version = "20250101000001");
/// ```
#[macro_export]
macro_rules! db_span {
    ($operation:expr) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4()
        )
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "db_operation",
            operation = %$operation,
            operation_id = %uuid::Uuid::new_v4(),
            $($field)*
        )
    };
}

fn env_filter(config: &ObservabilityConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
}

/// Install the global subscriber.
///
/// Returns `false` when a subscriber was already installed (e.g. by a test
/// harness); that is not an error.
pub fn init_logging(config: &ObservabilityConfig) -> bool {
    let registry = tracing_subscriber::registry().with(env_filter(config));

    let installed = if config.json_logging {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.is_ok()
}

/// Log configuration at startup
pub fn log_config_info(config: &Config) {
    let database_type = if config.database.is_memory() { "memory" } else { "postgresql" };

    tracing::info!(
        server_address = %config.api.socket_address(),
        database_type,
        max_connections = config.database.max_connections,
        auto_migrate = config.database.auto_migrate,
        metrics_enabled = config.observability.enable_metrics,
        json_logging = config.observability.json_logging,
        "Listener service configuration"
    );
}
