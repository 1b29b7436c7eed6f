//! Logging Infrastructure
//!
//! Structured logging setup. Audit entries produced by barrel mutations are
//! emitted with `target: "audit"` so a host application can split them into
//! a permanent file if it wants to.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, prelude::*};

/// Initialize the logging system (console only).
///
/// # Arguments
/// * `level` - Log level (e.g. "info", "debug", "warn")
/// * `json_format` - JSON output (true for production, false for development)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        subscriber
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_file(true).with_line_number(true))
            .init();
    }

    Ok(())
}

/// Audit log helper - records barrel mutations.
///
/// # Examples
/// ```no_run
/// barrel_engine::audit_log!("Juan Doe", "set_status", "barrel:BRL-001", "llenado");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user = $user,
            action = $action,
            resource = $resource,
            "AUDIT"
        );
    };
    ($user:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user = $user,
            action = $action,
            resource = $resource,
            details = $details,
            "AUDIT"
        );
    };
}
