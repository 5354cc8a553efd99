//! Stderr logging for the CLI.
//!
//! Filtering follows `MINDWEAVE_LOG` (standard `EnvFilter` syntax) and defaults to `warn`, so
//! ordinary command output on stdout stays clean.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_ENV: &str = "MINDWEAVE_LOG";

pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "mindweave_core=debug,mindweave_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .without_time();
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
