//! Logging setup
//!
//! Uses `tracing` with a `tracing-subscriber` fmt layer. The level comes from
//! `RUST_LOG` (default: info), e.g. `RUST_LOG=industry_calculator=debug`.

use tracing_subscriber::{EnvFilter, fmt};

/// Initialize logging for the CLI. Logs go to stderr so reports on stdout
/// stay clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize logging for tests; safe to call more than once
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
