//! Diagnostic logging setup.
//!
//! The library logs through `tracing` macros only; the binary installs a
//! subscriber once at startup. Logs go to stderr so JSON on stdout stays
//! machine-readable.

use crate::config::LogLevel;
use crate::{Error, Result};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when it is set and valid.
pub fn init(level: LogLevel) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()
        .map_err(|e| Error::Other(format!("Failed to initialize logging: {}", e)))
}
