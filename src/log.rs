//! Logging utilities

use once_cell::sync::Lazy;
use tracing::{debug, error};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

/// Whether the `DEBUG` environment flag was set for this run.
///
/// The flag drives two things: verbose diagnostics on stderr, and
/// indented JSON on stdout. It never changes what is queried.
pub(crate) static DEBUG: Lazy<bool> = Lazy::new(|| std::env::var_os("DEBUG").is_some());

pub(crate) fn init() {
    let level = if *DEBUG {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };

    let filter = EnvFilter::try_from_env("PAQUERY_LOG")
        .unwrap_or_default()
        .add_directive(level.into());

    // stdout carries the JSON body, so diagnostics go to stderr
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
    debug!("logger initialised");
}

/// Create an oops (a fatal crash) with an associated error message
pub(crate) fn oops<S: Into<String>>(msg: S, code: u16) -> ! {
    error!("{}", msg.into());
    std::process::exit(code.into());
}
