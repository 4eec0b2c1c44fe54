//! Logging facilities for Canopy.
//!
//! Canopy logs through the `tracing` crate. Libraries only emit events; an
//! application (or a test) installs a subscriber, for example with
//! [`init_tracing`]:
//!
//! ```no_run
//! canopy_core::init_tracing("canopy=debug");
//! ```
//!
//! Use the [`targets`] constants to filter logs by subsystem.

use tracing_subscriber::EnvFilter;

/// Target names for log filtering.
pub mod targets {
    /// Core plumbing target.
    pub const CORE: &str = "canopy_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "canopy_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "canopy_core::timer";
    /// Directory enumeration.
    pub const REPOSITORY: &str = "canopy::repository";
    /// Tree expansion and the non-empty directory filter.
    pub const TREE: &str = "canopy::tree";
    /// Press-and-hold detection.
    pub const GESTURE: &str = "canopy::gesture";
    /// In-place rename workflow.
    pub const RENAME: &str = "canopy::rename";
    /// Path and list synchronization.
    pub const NAVIGATION: &str = "canopy::navigation";
    /// Filesystem change notification.
    pub const WATCHER: &str = "canopy::watcher";
    /// Configuration and snapshot files.
    pub const CONFIG: &str = "canopy::config";
    /// [`PerfSpan`](super::PerfSpan) timings.
    pub const PERF: &str = "canopy::perf";
}

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over `default_filter`. Calling this more than
/// once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A guard that keeps a tracing span open until dropped.
///
/// Wrap an operation in a `PerfSpan` to record its duration in any
/// subscriber that tracks span timings.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice() {
        init_tracing("canopy=trace");
        init_tracing("canopy=info");
        tracing::debug!(target: targets::CORE, "still logging");
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
