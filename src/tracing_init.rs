//! Tracing initialization for tests and binaries
//!
//! Both entry points build their filter the same way, first match wins:
//! 1. `RUST_LOG`, the usual `tracing-subscriber` directives
//! 2. `RUSTYPNM_LOG`, directives scoped to this crate without disturbing
//!    `RUST_LOG` for the rest of a host application
//! 3. the entry point's default (`rustypnm=warn` in tests, `rustypnm=info` in binaries)
//!
//! Unparseable directives are skipped in favour of the next source.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

/// Crate-specific filter variable consulted when `RUST_LOG` is unset or invalid
pub const LOG_ENV: &str = "RUSTYPNM_LOG";

pub const TEST_DEFAULT_FILTER: &str = "rustypnm=warn";
pub const BINARY_DEFAULT_FILTER: &str = "rustypnm=info";

/// Resolve a filter from the given directive sources
pub fn build_filter(rust_log: Option<&str>, crate_log: Option<&str>, default: &str) -> EnvFilter {
    [rust_log, crate_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

fn filter_from_env(default: &str) -> EnvFilter {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let crate_log = std::env::var(LOG_ENV).ok();
    build_filter(rust_log.as_deref(), crate_log.as_deref(), default)
}

/// Initialize tracing for tests
///
/// - `RUSTYPNM_LOG=rustypnm=debug` - all decoder and analysis summaries
/// - `RUSTYPNM_LOG=rustypnm::echo::ifft=trace` - one module only
/// - `RUST_LOG=rustypnm=debug,rustypnm::pnm=trace` - mixed levels
///
/// Multiple calls are safe (uses once_cell).
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        // Another harness may already own the global subscriber
        let _ = fmt()
            .with_env_filter(filter_from_env(TEST_DEFAULT_FILTER))
            .with_target(true)
            .with_thread_ids(false)
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&TRACING);
}

/// Initialize tracing for binaries
///
/// Call this early in main(). Output goes to stderr so stdout stays clean for
/// decoded records.
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(filter_from_env(BINARY_DEFAULT_FILTER))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}
