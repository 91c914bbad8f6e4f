//! Caller-supplied cancellation signal for command handlers and workers.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cheap, cloneable cancellation flag.
///
/// Handlers check it before each store round trip and before publishing, so a
/// cancelled caller aborts promptly. Cancellation between the store write and
/// the publish leaves a partial effect (state persisted, event unpublished);
/// that window is tolerated, the consumer side stays idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
