//! Log setup for `wenettx` and the unit tests
//!
//! Both read `RUST_LOG` first; the defaults below only apply when it is
//! unset or unparsable.
//!
//! - `RUST_LOG=rustywenet::interleaver=trace` - every flush and padded stream
//! - `RUST_LOG=rustywenet::ldpc=trace` - parity bits of every encoded block

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive used when `RUST_LOG` is not set
///
/// `verbose` raises the library and binary targets from info to debug.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "rustywenet=debug,wenettx=debug"
    } else {
        "rustywenet=info,wenettx=info"
    }
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber for the transmit tool
///
/// Logs go to stderr so they never mix with encoded output.
pub fn init_tracing(verbose: bool) {
    fmt()
        .with_env_filter(env_filter(default_directive(verbose)))
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Install a test-captured subscriber once per test binary
#[cfg(test)]
pub fn init_test_tracing() {
    use once_cell::sync::Lazy;

    static TRACING: Lazy<()> = Lazy::new(|| {
        // try_init: another harness may already own the global subscriber
        let _ = fmt()
            .with_env_filter(env_filter("rustywenet=warn"))
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&TRACING);
}
