//! Tracing initialization.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber, logging to stderr.
///
/// `RUST_LOG` takes precedence over `fallback`.
///
/// ```bash
/// RUST_LOG=stowage_loader=debug stowage --namespace ns --bucket docs
/// ```
pub fn init_tracing(fallback: &str) -> anyhow::Result<()> {
    let env_filter = create_env_filter(fallback)?;
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    Ok(())
}

/// Creates an environment filter for tracing.
fn create_env_filter(fallback: &str) -> anyhow::Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {e}"))
}
