use std::time::Duration;

use anyhow::Context;
use cadence_domain::{CadenceError, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Logs go to stderr so stdout stays reserved for command responses.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log filter: {}", config.level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    let installed = if config.json {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.with_target(true).try_init()
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` must be a stable identifier such as `"series::create"`; never
/// pass request payloads through it.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, success: bool) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, "command_execution_failure");
    }
}

/// Stable label per error kind, used in logs and in error responses.
#[inline]
pub const fn error_label(error: &CadenceError) -> &'static str {
    match error {
        CadenceError::NotFound(_) => "not_found",
        CadenceError::InactiveReference(_) => "inactive_reference",
        CadenceError::InvalidState(_) => "invalid_state",
        CadenceError::InvalidTransition { .. } => "invalid_transition",
        CadenceError::Validation(_) => "validation",
        CadenceError::Conflict(_) => "conflict",
        CadenceError::Database(_) => "database",
        CadenceError::Config(_) => "config",
        CadenceError::Internal(_) => "internal",
    }
}
