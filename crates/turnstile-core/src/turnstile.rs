//! The round-robin turnstile primitive.
//!
//! A [`Turnstile`] owns a monotonically increasing turn counter behind a
//! mutex, paired one-to-one with a condition variable. Worker `id` is
//! eligible exactly when `turn_count % participants == id`. Waiters block
//! on the condvar and re-check the predicate in a loop on every wakeup;
//! completing a pass increments the counter and broadcasts to all waiters.
//!
//! Broadcast (never single-wakeup) is load-bearing: the next eligible
//! waiter is not necessarily the most recently blocked one, so everyone is
//! woken and the ineligible re-check themselves back to sleep.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::TurnstileError;

struct TurnState {
    turn_count: u64,
}

/// Strict round-robin turn-taking among a fixed set of participants.
///
/// Created once, shared (typically via `Arc`) with every worker, and
/// destroyed only after all workers have observably finished.
pub struct Turnstile {
    participants: usize,
    state: Mutex<TurnState>,
    turn_available: Condvar,
}

impl Turnstile {
    /// Construct a turnstile for `participants` workers, starting at turn 0.
    pub fn new(participants: usize) -> Result<Self, TurnstileError> {
        if participants == 0 {
            return Err(TurnstileError::InvalidParticipantCount(participants));
        }
        Ok(Self {
            participants,
            state: Mutex::new(TurnState { turn_count: 0 }),
            turn_available: Condvar::new(),
        })
    }

    /// Fixed participant count set at construction.
    #[must_use]
    pub fn participants(&self) -> usize {
        self.participants
    }

    /// Current value of the turn counter.
    #[must_use]
    pub fn turn_count(&self) -> u64 {
        self.state.lock().turn_count
    }

    /// Block until it is `id`'s turn, returning the capability to run the
    /// critical section and advance the rotation.
    ///
    /// The predicate is re-checked in a loop after every wakeup, so spurious
    /// wakeups and broadcasts meant for other workers put the caller back to
    /// sleep. The lock is released while suspended and reacquired atomically
    /// on wakeup; the returned [`TurnPass`] holds it until the pass ends.
    pub fn await_turn(&self, id: usize) -> Result<TurnPass<'_>, TurnstileError> {
        self.check_id(id)?;
        let mut state = self.state.lock();
        while !self.is_turn(&state, id) {
            self.turn_available.wait(&mut state);
        }
        Ok(self.pass(state))
    }

    /// Bounded variant of [`Turnstile::await_turn`].
    ///
    /// Fails with [`TurnstileError::Timeout`] if the turn has not arrived by
    /// the deadline; on that path the lock is released and the turn counter
    /// is untouched, so a healthy rotation is unaffected.
    pub fn await_turn_for(
        &self,
        id: usize,
        timeout: Duration,
    ) -> Result<TurnPass<'_>, TurnstileError> {
        self.check_id(id)?;
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        while !self.is_turn(&state, id) {
            if self
                .turn_available
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                // The turn may have arrived in the same instant the wait
                // expired; the predicate decides, not the clock.
                if self.is_turn(&state, id) {
                    break;
                }
                return Err(TurnstileError::Timeout {
                    id,
                    waited: timeout,
                });
            }
        }
        Ok(self.pass(state))
    }

    fn check_id(&self, id: usize) -> Result<(), TurnstileError> {
        if id >= self.participants {
            return Err(TurnstileError::WorkerIdOutOfRange {
                id,
                participants: self.participants,
            });
        }
        Ok(())
    }

    fn is_turn(&self, state: &TurnState, id: usize) -> bool {
        state.turn_count % self.participants as u64 == id as u64
    }

    fn pass<'a>(&'a self, guard: MutexGuard<'a, TurnState>) -> TurnPass<'a> {
        TurnPass {
            turn: guard.turn_count,
            guard: Some(guard),
            turn_available: &self.turn_available,
        }
    }
}

/// Exclusive capability to run the critical section for one turn.
///
/// Holding a `TurnPass` is the only way to be inside the critical section,
/// and advancing the rotation is the only way out: whether the pass is
/// [`complete`](TurnPass::complete)d, dropped, or unwound by a panic, the
/// turn counter is incremented and all waiters are woken. A missing
/// handoff on some control path is therefore unrepresentable.
pub struct TurnPass<'a> {
    guard: Option<MutexGuard<'a, TurnState>>,
    turn_available: &'a Condvar,
    turn: u64,
}

impl TurnPass<'_> {
    /// Value of the turn counter at critical-section entry.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// Advance the rotation: increment the counter, wake all waiters, and
    /// release the lock.
    pub fn complete(self) {
        // Drop does the handoff.
    }
}

impl Drop for TurnPass<'_> {
    fn drop(&mut self) {
        if let Some(mut guard) = self.guard.take() {
            guard.turn_count += 1;
            // Broadcast while still holding the lock, as the waiters'
            // re-check loop expects.
            self.turn_available.notify_all();
            drop(guard);
        }
    }
}
