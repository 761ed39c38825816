//! Cooperative cancellation for tagging runs
//!
//! The caller sets the token; the tagger polls it once per cluster, before
//! starting the next one. Clusters already tagged stay tagged.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cooperative cancellation token.
///
/// Clones share state, so a signal handler can hold one clone while the
/// tagger polls another. Setting it mid-cluster has no effect until that
/// cluster's partition-and-tag sequence finishes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    requested: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }
}
