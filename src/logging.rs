//! Tracing subscriber setup.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` takes precedence over the
/// configured level.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let installed = match config.format.as_str() {
        "json" => fmt().json().with_env_filter(filter).try_init(),
        _ => fmt().with_env_filter(filter).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))
}
