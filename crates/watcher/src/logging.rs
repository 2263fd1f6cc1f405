//! Tracing subscriber bootstrap

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered at `level`
///
/// `RUST_LOG` takes precedence when set. Fails instead of panicking if a
/// global subscriber is already installed.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = build_filter(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level.trim())
            .with_context(|| format!("invalid log level `{level}`")),
    }
}
