//! Telemetry initialization.
//!
//! Controlled by `KONVOI_LOG_FORMAT`:
//! - unset or `"text"` → compact human-readable events to stderr
//! - `"json"` → JSON events to stderr (for log shipping)
//!
//! Event filtering uses the standard `RUST_LOG` env filter, defaulting to
//! `info`.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber once, at process start.
///
/// Safe to call in tests too — a second call is a no-op because the global
/// subscriber is already set.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("KONVOI_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let result = if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
    };

    // Already initialized (tests, embedding) — keep the existing one.
    drop(result);
}
