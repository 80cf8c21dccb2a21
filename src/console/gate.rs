//! Execution serializer
//!
//! A mutual-exclusion gate admitting one command at a time. Waiters are
//! admitted in FIFO submission order, so commands are processed strictly in
//! the order they were submitted even when the terminal delivers the next
//! one before the previous finished.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// FIFO gate serializing command processing.
#[derive(Clone)]
pub struct ExecGate {
    permits: Arc<Semaphore>,
}

/// Held while a command is being processed; releases the gate on drop, so
/// the lock is released on every exit path.
pub struct GateGuard {
    _permit: OwnedSemaphorePermit,
}

impl ExecGate {
    /// Create an open gate.
    pub fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(1)),
        }
    }

    /// Wait until no other command is in flight, then hold the gate.
    pub async fn acquire(&self) -> GateGuard {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .expect("gate semaphore never closed");
        GateGuard { _permit: permit }
    }

    /// Wait for quiescence without holding the gate.
    pub async fn ready(&self) {
        drop(self.acquire().await);
    }
}

impl Default for ExecGate {
    fn default() -> Self {
        Self::new()
    }
}
