//! Logging setup for the TypeFast binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// `crate_name` is the library crate whose spans should be shown alongside the
/// binary's own (e.g. `"typefast_server"`). The level can be overridden with the
/// `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use typefast_shared::logger::setup_logger;
///
/// setup_logger("typefast_server", "typefast_server", "debug");
/// ```
pub fn setup_logger(crate_name: &str, binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(crate_name, binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(crate_name: &str, binary_name: &str, level: &str) -> String {
    format!(
        "{}={},{}={},typefast_shared={},tower_http={}",
        crate_name.replace('-', "_"),
        level,
        binary_name.replace('-', "_"),
        level,
        level,
        level
    )
}
