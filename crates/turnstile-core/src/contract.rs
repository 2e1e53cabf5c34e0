//! Clean-room semantics contract for turnstile waiters.
//!
//! Models the abstract per-waiter state machine as a deterministic pure
//! function, independent of the lock-and-condvar implementation in
//! [`crate::turnstile`]: `Blocked -> (wakeup) -> Recheck -> {Blocked again |
//! Eligible}`, then `Eligible -> InCritical -> (advance) -> Blocked or Done`.
//! Also hosts the boundary validators shared by the primitive and the
//! harness.

// ---------------------------------------------------------------------------
// Waiter state machine
// ---------------------------------------------------------------------------

/// Abstract state of one waiter between spawn and completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterContractState {
    /// Suspended on the condition, lock released.
    Blocked,
    /// Woken (broadcast or spurious), lock reacquired, predicate not yet
    /// evaluated.
    Recheck,
    /// Predicate held on re-check; entitled to enter the critical section.
    Eligible,
    /// Inside the critical section, lock held.
    InCritical,
    /// All rounds finished; the waiter never blocks again.
    Done,
}

/// Contract-level operation set for waiter transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaiterContractOp {
    /// A wakeup arrived (broadcast from an advancing worker, or spurious).
    Wakeup,
    /// Evaluate the turn predicate; `eligible` is its value.
    Observe { eligible: bool },
    /// Enter the critical section.
    Enter,
    /// Increment the turn counter, broadcast, release the lock.
    /// `more_rounds` is whether this waiter loops for another pass.
    Advance { more_rounds: bool },
}

/// Deterministic transition result for a waiter contract operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterContractOutcome {
    /// Next abstract state after applying the operation.
    pub next: WaiterContractState,
    /// Whether the operation was legal in the given state. Illegal
    /// operations are programmer errors and leave the state unchanged.
    pub ok: bool,
    /// Whether the operation suspends the waiter.
    pub blocks: bool,
    /// Whether the operation wakes every blocked waiter.
    pub broadcasts: bool,
}

const fn rejected(state: WaiterContractState) -> WaiterContractOutcome {
    WaiterContractOutcome {
        next: state,
        ok: false,
        blocks: false,
        broadcasts: false,
    }
}

/// Clean-room transition contract for one waiter.
///
/// Every wakeup leads through `Recheck`; a waiter never moves from
/// `Blocked` straight to `Eligible`, which is exactly the discipline that
/// makes spurious wakeups and same-broadcast contention harmless.
#[must_use]
pub const fn waiter_contract_transition(
    state: WaiterContractState,
    op: WaiterContractOp,
) -> WaiterContractOutcome {
    match state {
        WaiterContractState::Blocked => match op {
            WaiterContractOp::Wakeup => WaiterContractOutcome {
                next: WaiterContractState::Recheck,
                ok: true,
                blocks: false,
                broadcasts: false,
            },
            _ => rejected(state),
        },
        WaiterContractState::Recheck => match op {
            WaiterContractOp::Observe { eligible } => WaiterContractOutcome {
                next: if eligible {
                    WaiterContractState::Eligible
                } else {
                    WaiterContractState::Blocked
                },
                ok: true,
                blocks: !eligible,
                broadcasts: false,
            },
            _ => rejected(state),
        },
        WaiterContractState::Eligible => match op {
            WaiterContractOp::Enter => WaiterContractOutcome {
                next: WaiterContractState::InCritical,
                ok: true,
                blocks: false,
                broadcasts: false,
            },
            _ => rejected(state),
        },
        WaiterContractState::InCritical => match op {
            WaiterContractOp::Advance { more_rounds } => WaiterContractOutcome {
                next: if more_rounds {
                    WaiterContractState::Blocked
                } else {
                    WaiterContractState::Done
                },
                ok: true,
                blocks: false,
                broadcasts: true,
            },
            _ => rejected(state),
        },
        WaiterContractState::Done => rejected(state),
    }
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Returns true if `participants` is a legal turnstile size.
#[must_use]
pub const fn valid_participant_count(participants: usize) -> bool {
    participants >= 1
}

/// Returns true if `id` is a legal worker identity for `participants`.
#[must_use]
pub const fn valid_worker_id(id: usize, participants: usize) -> bool {
    valid_participant_count(participants) && id < participants
}

/// Identity of the worker that owns turn `turn_count`.
///
/// A zero participant count is not a legal turnstile size (see
/// [`valid_participant_count`]); it maps to owner 0 so the helper stays
/// total instead of dividing by zero.
#[must_use]
pub const fn turn_owner(turn_count: u64, participants: usize) -> usize {
    if participants == 0 {
        return 0;
    }
    (turn_count % participants as u64) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
