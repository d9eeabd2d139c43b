//! Cooperative cancellation of a running synchronization

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A shared flag observed by the controller between task executions.
///
/// Clones share the same flag, so a signal handler can hold one clone while
/// the controller holds another. Once requested it stays requested.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running synchronization to stop before its next task.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
