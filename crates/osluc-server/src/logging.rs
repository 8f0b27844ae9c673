//! Structured JSON logging, configured once at startup

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Parse a log level name such as `INFO` or `debug`
pub fn parse_level(value: &str) -> Option<Level> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("warning") {
        return Some(Level::WARN);
    }
    value.parse().ok()
}

/// Install the global subscriber. `RUST_LOG`, when set, takes precedence.
///
/// Returns the level in effect and whether the configured value was unusable.
pub fn init_tracing(configured: &str) -> (Level, bool) {
    let (level, fallback) = match parse_level(configured) {
        Some(level) => (level, false),
        None => (Level::INFO, true),
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_target(true))
        .init();

    (level, fallback)
}
