//! Countdown latch for observing detached-worker completion.
//!
//! Workers are fire-and-forget: nobody joins them. The driver instead
//! hands each worker a reference to a [`CompletionLatch`] and waits on it
//! with a bound, so teardown is keyed to observed completion rather than a
//! wall-clock guess.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// One-shot countdown latch over a mutex and condition variable.
pub struct CompletionLatch {
    remaining: Mutex<usize>,
    all_done: Condvar,
}

impl CompletionLatch {
    /// Latch that opens once `count` parties have counted down.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            all_done: Condvar::new(),
        }
    }

    /// Record one party as done. Counting down past zero is a no-op.
    pub fn count_down(&self) {
        let mut remaining = self.remaining.lock();
        if *remaining == 0 {
            return;
        }
        *remaining -= 1;
        if *remaining == 0 {
            self.all_done.notify_all();
        }
    }

    /// Parties still outstanding.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        *self.remaining.lock()
    }

    /// Block until every party has counted down.
    pub fn wait(&self) {
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            self.all_done.wait(&mut remaining);
        }
    }

    /// Block until every party has counted down or `timeout` elapses.
    /// Returns true if the latch opened in time.
    #[must_use]
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut remaining = self.remaining.lock();
        while *remaining > 0 {
            if self.all_done.wait_until(&mut remaining, deadline).timed_out() {
                return *remaining == 0;
            }
        }
        true
    }
}
