//! Single-flight guard for plot sessions.
//!
//! Triggers can arrive from any thread while a run is in progress. Only one
//! session may be active at a time; a trigger that loses the race is dropped
//! rather than queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide "a session is running" flag.
#[derive(Debug, Default)]
pub struct SessionGuard {
    active: AtomicBool,
}

impl SessionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard. Returns `false` if a session is already active.
    pub fn try_enter(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Release the guard so the next trigger can start a session.
    pub fn leave(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Claim the guard for the lifetime of the returned permit.
    pub fn try_acquire(self: &Arc<Self>) -> Option<SessionPermit> {
        self.try_enter().then(|| SessionPermit {
            guard: Arc::clone(self),
        })
    }
}

/// Held while a session runs; leaves the guard when dropped, including on
/// early return or panic.
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct SessionPermit {
    guard: Arc<SessionGuard>,
}

impl Drop for SessionPermit {
    fn drop(&mut self) {
        self.guard.leave();
    }
}
