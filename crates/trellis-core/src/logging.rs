//! Logging and tracing facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("trellis=debug,trellis_core=info")
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under one of the constants in [`targets`], so a
//! directive such as `trellis::router=trace` isolates event routing.

/// Span names used throughout Trellis for tracing.
pub mod span_names {
    /// One turn of the event loop.
    pub const EVENT_LOOP: &str = "trellis::event_loop";
    /// Timer expiry processing.
    pub const TIMER: &str = "trellis::timer";
    /// Deferred-call processing.
    pub const TASK: &str = "trellis::task";
    /// A full box layout pass.
    pub const LAYOUT: &str = "trellis::layout";
    /// A paint pass over a window subtree.
    pub const PAINT: &str = "trellis::paint";
}

/// Target names for log filtering.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "trellis_core";
    /// Event loop target.
    pub const EVENT_LOOP: &str = "trellis_core::event_loop";
    /// Timer system target.
    pub const TIMER: &str = "trellis_core::timer";
    /// Deferred-call queue target.
    pub const TASK: &str = "trellis_core::task";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Event router target.
    pub const ROUTER: &str = "trellis::router";
    /// Widget tree lifecycle target.
    pub const TREE: &str = "trellis::tree";
    /// Layout engine target.
    pub const LAYOUT: &str = "trellis::layout";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for measuring the duration of a layout or paint pass.
#[derive(Debug)]
pub struct PerfSpan {
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            _span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn test_perf_span() {
        setup();
        let _span = PerfSpan::new("test_operation");
        tracing::trace!(target: targets::CORE, value = 1, "inside span");
        tracing::debug!(target: targets::LAYOUT, "debug inside span");
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [targets::ROUTER, targets::TREE, targets::LAYOUT] {
            assert!(target.starts_with("trellis::"));
        }
        assert!(targets::TIMER.starts_with(targets::CORE));
    }
}
