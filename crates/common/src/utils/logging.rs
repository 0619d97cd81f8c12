use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize a compact tracing subscriber.
/// - Respects `RUST_LOG` if set, otherwise uses `default_filter`
/// - Writes to stderr; stdout carries rendered responses
pub fn init_logging_default(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(io::stderr)
        .try_init();
}

/// Initialize a tracing subscriber with JSON structured output.
/// - Respects `RUST_LOG` if set, otherwise uses `default_filter`
/// - One JSON object per line on stderr
pub fn init_logging_json(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .json()
        .with_writer(io::stderr)
        .try_init();
}
