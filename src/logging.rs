//! Logging setup.
//!
//! The crate logs through the `log` macros; the binary installs a
//! `tracing-subscriber` formatter on stderr, which picks up `log` records as
//! well. Stdout stays reserved for the result line.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding a filter directive, e.g. `ws_book=trace`.
pub const LOG_ENV: &str = "WS_BOOK_LOG";

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "warn"
    }
}

/// Build the filter: `--debug` wins, then `WS_BOOK_LOG`, then warnings only.
pub fn filter(debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new(default_directive(true));
    }
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive(false)))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init(debug: bool) -> Result<()> {
    fmt()
        .with_env_filter(filter(debug))
        .with_target(debug)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {e}"))
}
