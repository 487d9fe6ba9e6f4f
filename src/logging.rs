//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` overrides the default level.
pub fn init(verbose: bool) {
    let default = if verbose { "tft_scout=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let result = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    if result.is_ok() {
        tracing::debug!("logger initialized");
    }
}
