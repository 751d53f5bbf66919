//! Logging Module
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::utils::error::{Result, SamplerError};

/// Filter used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

/// Initialize logging from `RUST_LOG`, defaulting to `info` (or `debug` when verbose)
///
/// Fails if a global subscriber is already installed.
pub fn init_env_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::registry()
        .with(fmt::layer().compact())
        .with(filter)
        .try_init()
        .map_err(|e| {
            SamplerError::InvalidConfiguration(format!("Failed to initialize logger: {e}"))
        })?;

    Ok(())
}
