//! Error taxonomy for the turnstile primitive and its driver.
//!
//! Invalid-argument errors are detected at the boundary and mutate no
//! state. Spawn failures are fatal and propagate to the caller; the
//! primitive has no transient-failure states once constructed, so nothing
//! here is retried.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurnstileError {
    /// Participant count must be at least 1.
    #[error("invalid participant count {0}: a turnstile needs at least one participant")]
    InvalidParticipantCount(usize),
    /// Worker id must lie in `[0, participants)`.
    #[error("worker id {id} out of range for {participants} participants")]
    WorkerIdOutOfRange { id: usize, participants: usize },
    /// A bounded wait expired before the turn arrived.
    #[error("worker {id} timed out after {waited:?} waiting for its turn")]
    Timeout { id: usize, waited: Duration },
    /// Thread spawn failed (resource exhaustion).
    #[error("worker spawn failed: {0}")]
    Spawn(#[from] std::io::Error),
    /// The driver's bounded completion wait expired with workers still
    /// outstanding.
    #[error("{outstanding} workers still outstanding after {waited:?}")]
    Incomplete { outstanding: usize, waited: Duration },
}

impl TurnstileError {
    /// Returns true for boundary validation failures (bad `N` or `id`).
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            TurnstileError::InvalidParticipantCount(_) | TurnstileError::WorkerIdOutOfRange { .. }
        )
    }
}
