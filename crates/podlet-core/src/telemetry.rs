//! Metrics emitted by a podlet
//!
//! Recorded through the `metrics` facade; without an installed recorder these
//! calls are no-ops, so they can never interrupt construction or a request.

use std::time::Duration;

/// Version descriptor gauge, set once per constructed podlet
pub const VERSION_INFO: &str = "podium_podlet_version_info";

/// Duration of [`crate::Podlet::process`]
pub const PROCESS_DURATION: &str = "podium_podlet_process_duration_seconds";

pub(crate) fn record_version_info(name: &str, version: &str) {
    metrics::gauge!(
        VERSION_INFO,
        "podlet" => name.to_string(),
        "version" => version.to_string(),
        "major" => env!("CARGO_PKG_VERSION_MAJOR"),
        "minor" => env!("CARGO_PKG_VERSION_MINOR"),
        "patch" => env!("CARGO_PKG_VERSION_PATCH"),
    )
    .set(1.0);
}

pub(crate) fn record_process(name: &str, development: bool, proxied: bool, elapsed: Duration) {
    metrics::histogram!(
        PROCESS_DURATION,
        "podlet" => name.to_string(),
        "proxy" => if proxied { "true" } else { "false" },
        "development" => if development { "true" } else { "false" },
    )
    .record(elapsed.as_secs_f64());
}
