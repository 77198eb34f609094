//! Integration test for telemetry initialization
//!
//! Runs in its own binary so the global subscriber is untouched before the
//! test installs it.

use chromeforge::telemetry::init_telemetry;
use tracing::Level;

#[test]
fn test_configured_level_takes_effect() {
    // An ambient RUST_LOG would override the level under test
    std::env::remove_var("RUST_LOG");

    init_telemetry("debug");

    // The configured level governs the installed filter
    assert!(tracing::enabled!(Level::DEBUG));
    assert!(!tracing::enabled!(Level::TRACE));

    // A later call must not clobber the installed subscriber
    init_telemetry("error");
    assert!(tracing::enabled!(Level::DEBUG));
}
