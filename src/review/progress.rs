//! Progress and log reporting
//!
//! The tagger reports what it is doing through a `ProgressSink`. Sinks are
//! best-effort: nothing they do feeds back into control flow.

/// Receives status lines, progress counters and log messages.
///
/// Every method defaults to doing nothing, so a sink only overrides what
/// it displays.
pub trait ProgressSink {
    /// Overall run status (e.g. the cluster being tagged)
    fn main_status(&self, _status: &str) {}

    /// Position within the selected clusters
    fn main_progress(&self, _current: usize, _total: usize) {}

    /// Step within the current cluster
    fn sub_status(&self, _status: &str) {}

    /// Position within the current step
    fn sub_progress(&self, _current: usize, _total: usize) {}

    /// Free-form log line
    fn log(&self, _message: &str) {}
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {}

/// Forwards statuses and log lines to `tracing`.
///
/// Statuses and messages are `info`; counters are `trace`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn main_status(&self, status: &str) {
        tracing::info!("{}", status);
    }

    fn main_progress(&self, current: usize, total: usize) {
        tracing::trace!(current, total, "cluster progress");
    }

    fn sub_status(&self, status: &str) {
        tracing::info!("  {}", status);
    }

    fn sub_progress(&self, current: usize, total: usize) {
        tracing::trace!(current, total, "step progress");
    }

    fn log(&self, message: &str) {
        tracing::debug!("{}", message);
    }
}
