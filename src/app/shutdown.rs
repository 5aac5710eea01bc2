//! Cooperative shutdown signal.
//!
//! The only asynchronous input the controller recognises.  The stop-button
//! interrupt (or a test) calls [`ShutdownToken::request`]; the controller
//! checks [`ShutdownToken::is_requested`] at the top of every state and
//! between idle polls, then runs its safe-state teardown.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable, lock-free cancellation flag.  Safe to set from ISR context.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the controller to stop.  Idempotent.
    pub fn request(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}
