//! Logging facilities for Trellis.
//!
//! Trellis instruments itself with the `tracing` crate and never installs
//! a subscriber; applications that want log output install their own:
//!
//! ```ignore
//! tracing_subscriber::fmt::init();
//! ```

/// Span names used throughout Trellis for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Signal emission span.
    pub const SIGNAL: &str = "trellis::signal";
    /// Observer dispatch span.
    pub const DISPATCH: &str = "trellis::dispatch";
    /// Binding resolution span.
    pub const BINDING: &str = "trellis::binding";
    /// Selection mutation span.
    pub const SELECTION: &str = "trellis::selection";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "trellis_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Observer dispatch target.
    pub const DISPATCHER: &str = "trellis_core::dispatcher";
    /// Binding engine target.
    pub const BINDING: &str = "trellis::binding";
    /// Selection model target.
    pub const SELECTION: &str = "trellis::selection";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of bulk operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "trellis::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // Just ensure it compiles and doesn't panic without a subscriber.
        let _span = PerfSpan::new("test_operation");
    }
}
