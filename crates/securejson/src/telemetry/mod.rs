//! Telemetry initialisation: structured JSON logs via `tracing-subscriber`.
//!
//! # Telemetry invariants
//!
//! - **No PII or key material** must appear in any log field. Record names,
//!   field aliases and failure reason codes are allowed; plaintext values,
//!   passwords, keys and envelope text are not.
//! - Log level is configurable via `SECUREJSON_LOG_LEVEL` (default: `info`);
//!   `RUST_LOG` takes precedence when set.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Initialise the global tracing subscriber.
///
/// Outputs structured JSON logs to stdout at the configured log level.
///
/// # Errors
///
/// Returns an error if the subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise tracing subscriber: {e}"))
}
