// src/logging.rs
// =============================================================================
// tracing-subscriber setup.
//
// Logs go to stderr so they never mix into the progress line on stdout.
// RUST_LOG wins when set; otherwise --verbose picks debug over info.
// =============================================================================

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sitecore_export={}", default_level)));

    // try_init: a second call (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
