//! Shutdown latch for the exporter.
//!
//! A single `parking_lot::Mutex<bool>` serializes reads and the one write.
//! Both critical sections are a single load or store; the lock is never held
//! across encoding or I/O.
//!
//! Shutdown does not wait for exports already past the check. A write that
//! started before the flag flipped completes normally.

use parking_lot::Mutex;

/// One-way shutdown flag. Starts false, latches true on the first
/// [`shutdown`](LifecycleGuard::shutdown) and never reverts.
#[derive(Debug, Default)]
pub struct LifecycleGuard {
    shut_down: Mutex<bool>,
}

impl LifecycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latch the flag. Safe to call repeatedly; always returns true.
    pub fn shutdown(&self) -> bool {
        *self.shut_down.lock() = true;
        true
    }

    /// Latch the flag and report whether this call was the one that
    /// flipped it.
    pub fn shutdown_first(&self) -> bool {
        let mut flag = self.shut_down.lock();
        let first = !*flag;
        *flag = true;
        first
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shut_down.lock()
    }
}
