//! Tracing subscriber setup for the command-line binary.

use anyhow::Context as _;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "warn,oj_scrape=info";

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Stdout stays reserved for JSON output.
pub fn init() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(DEFAULT_FILTER))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
