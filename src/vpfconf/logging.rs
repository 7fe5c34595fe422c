//! Logging setup for the `vpfconf` binary.
//!
//! The library only emits `tracing` events; this installs a stderr
//! subscriber so stdout stays clean for property output.
//!
//! Filter resolution:
//! - `VPFCONF_LOG` when set (standard `EnvFilter` directives)
//! - otherwise `debug` with `--verbose`, `warn` without

use std::io;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "VPFCONF_LOG";

pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level(verbose)))
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(verbose: bool) {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(stderr_layer)
        .try_init();
}
