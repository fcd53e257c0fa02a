//! Tracing subscriber setup

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const APP_TARGET: &str = "fxconv";

/// Picks the event filter: valid `RUST_LOG` directives win, otherwise `verbose` decides.
fn build_filter(verbose: bool, env_directives: Option<&str>) -> EnvFilter {
    env_directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| {
            if verbose {
                EnvFilter::new(format!("{APP_TARGET}=debug"))
            } else {
                EnvFilter::new("off")
            }
        })
}

/// Installs the global subscriber. Events go to stderr so stdout only carries command output.
pub fn init_logging(verbose: bool) -> Result<()> {
    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(build_filter(verbose, env_directives.as_deref()))
        .try_init()
        .context("Failed to initialise logging")
}
