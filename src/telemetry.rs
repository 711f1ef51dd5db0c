//! Logging initialization
//!
//! Controlled by `TWIG_LOG`, an `EnvFilter` directive such as `debug` or
//! `twig::artifacts::merge=trace`. Unset means `warn`. Events go to stderr so
//! command output on stdout stays clean.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "TWIG_LOG";

const DEFAULT_FILTER: &str = "warn";

pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // a second initialization (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
