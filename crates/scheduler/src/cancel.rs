//! Cancellation tokens for slice requests
//!
//! Every slice request carries a token. When the window controller issues a
//! newer request the old token is cancelled, so data sources can stop
//! refining a window nobody is waiting for.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cooperative cancellation flag shared between a request and its source
///
/// Clones share the same state, so a source holding a clone observes the
/// cancellation made by the controller. Tokens may cross threads.
///
/// # Example
///
/// ```
/// use media_viewer_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let source_side = token.clone();
///
/// token.cancel();
/// assert!(source_side.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Cancel this token and every clone of it
    ///
    /// Idempotent.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
