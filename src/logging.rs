//! # Structured Logging Module
//!
//! Environment-aware structured logging for the dispatch engine. Notification
//! failures and route computations are observable here without ever being
//! surfaced to transition callers.

use std::sync::OnceLock;

use chrono::Utc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use uuid::Uuid;

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(log_level)),
        );

        // A global subscriber may already be installed by the embedding
        // application; continue with it.
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(environment = %environment, "Structured logging initialized");
    });
}

/// Get current environment from environment variables.
fn get_environment() -> String {
    std::env::var("COURIER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment.
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for order lifecycle operations.
pub fn log_order_operation(
    operation: &str,
    order_id: Option<Uuid>,
    status: &str,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        order_id = order_id.map(|id| id.to_string()),
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📦 ORDER_OPERATION"
    );
}

/// Log structured data for fanout operations.
pub fn log_fanout_operation(
    operation: &str,
    order_id: Option<Uuid>,
    delivered_to: usize,
    details: Option<&str>,
) {
    tracing::debug!(
        operation = %operation,
        order_id = order_id.map(|id| id.to_string()),
        delivered_to = delivered_to,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📡 FANOUT_OPERATION"
    );
}

/// Log an error with component context.
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_detection() {
        std::env::set_var("COURIER_ENV", "test_override");
        let env = get_environment();
        assert_eq!(env, "test_override");
        std::env::remove_var("COURIER_ENV");
    }

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("unknown"), "debug");
    }
}
