//! Cooperative cancellation shared across the scanner, pool, and dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag. All long operations check this at their
/// suspension points; setting it never interrupts a running regex.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every holder of this token.
    pub fn cancel(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }

    /// Reset for reuse between scans.
    pub fn reset(&self) {
        self.inner.store(false, Ordering::SeqCst);
    }

    /// Raw atomic for APIs that take `&AtomicBool`.
    pub fn as_atomic(&self) -> &AtomicBool {
        &self.inner
    }
}
