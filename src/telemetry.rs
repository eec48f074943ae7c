//! Structured logging setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the process-wide JSON subscriber. Respects `RUST_LOG`, with
/// debug-level engine output as the fallback.
pub fn init_tracing() {
    init_with_default("info,coinche_engine=debug");
}

/// Like [`init_tracing`] with a caller-supplied fallback filter. Later
/// calls are no-ops, so tests can install logging without coordinating.
pub fn init_with_default(directives: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(false)
        .json();

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
