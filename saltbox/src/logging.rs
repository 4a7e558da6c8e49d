//! Tracing setup for the `saltbox` binary.
//!
//! Build steps report through `events::TracingSink`; this module only
//! installs the subscriber that prints them.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "saltbox=info";

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, falling back to [`DEFAULT_FILTER`]. Output: stderr,
/// compact format, so stdout stays clean for `saltbox config`.
///
/// # Example
/// ```bash
/// RUST_LOG=saltbox=debug saltbox build --manifest kitchen.yml --sandbox /tmp/sb
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
