//! Telemetry setup
//!
//! One-shot `tracing-subscriber` installation, performed after configuration
//! is loaded so the configured `server.log_level` actually takes effect. A
//! `RUST_LOG` environment variable overrides the config value entirely.
//! Output is pretty-printed in debug builds and JSON in release builds.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber at the given level.
///
/// Call exactly once, with the level from config. Filter priority:
/// `RUST_LOG` env var > `log_level` parameter. A second call is a quiet
/// no-op (tests share one process).
pub fn init_telemetry(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{0},chromeforge={0}", log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    if cfg!(debug_assertions) {
        registry
            .with(fmt::layer().pretty().with_target(false))
            .try_init()
            .ok();
    } else {
        registry
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }
}
