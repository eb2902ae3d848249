//! Diagnostic logging.
//!
//! Command output goes to stdout with `println!`; this only wires up the
//! `tracing` events emitted by the core, written to stderr.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV_VAR: &str = "TWIG_LOG";
pub const DEFAULT_LEVEL: &str = "warn";

/// Installs the global subscriber.
///
/// Priority: `TWIG_LOG`, then `configured` (the `log.level` setting), then
/// `warn`. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(configured: Option<&str>) {
    let filter = build_env_filter(configured);

    let _ = Registry::default()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

fn build_env_filter(configured: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return filter;
    }
    configured
        .and_then(|level| EnvFilter::try_new(level).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LEVEL))
}
