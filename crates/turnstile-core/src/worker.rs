//! Worker-loop driver for the round-robin demonstration.
//!
//! Spawns N detached workers over one shared [`Turnstile`]. Each worker
//! loops: stop-flag check, `await_turn`, record the `(id, turn)` entry while
//! holding the pass, `complete()`, then any unit of work outside the lock.
//! The driver never joins a worker; it waits on a [`CompletionLatch`] with
//! an explicit bound and propagates the first worker error.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::TurnstileError;
use crate::latch::CompletionLatch;
use crate::turnstile::Turnstile;

/// Parameters for one demonstration run.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of participants (N).
    pub workers: usize,
    /// Passes each worker must complete.
    pub rounds: usize,
    /// Per-turn wait bound; `None` waits indefinitely.
    pub turn_timeout: Option<Duration>,
}

impl WorkerConfig {
    /// Bound for the driver's completion wait.
    ///
    /// With a per-turn timeout configured, every turn in the run is given
    /// its full budget plus slack; otherwise a fixed generous ceiling. The
    /// bound exists so a stalled rotation is reported, never slept through.
    #[must_use]
    pub fn completion_bound(&self) -> Duration {
        match self.turn_timeout {
            Some(per_turn) => {
                let steps = self.workers.saturating_mul(self.rounds).clamp(1, 10_000) as u32;
                per_turn.saturating_mul(steps) + Duration::from_secs(5)
            }
            None => Duration::from_secs(60),
        }
    }
}

/// One critical-section entry: which worker, at which turn count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub id: usize,
    pub turn: u64,
}

/// Result of a completed demonstration run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Entries in critical-section order.
    pub entries: Vec<Entry>,
    /// Turn counter after all workers finished.
    pub final_turn_count: u64,
}

/// Run `config.workers` detached workers for `config.rounds` passes each.
pub fn run_round_robin(config: &WorkerConfig) -> Result<RunOutcome, TurnstileError> {
    run_round_robin_with_stop(config, &Arc::new(AtomicBool::new(false)))
}

/// [`run_round_robin`] with an externally owned stop flag.
///
/// Raising the flag halts every worker at its next between-rounds check;
/// a worker already suspended in `await_turn` is not interrupted (bound the
/// wait with [`WorkerConfig::turn_timeout`] if that matters).
pub fn run_round_robin_with_stop(
    config: &WorkerConfig,
    stop: &Arc<AtomicBool>,
) -> Result<RunOutcome, TurnstileError> {
    let turnstile = Arc::new(Turnstile::new(config.workers)?);
    let entries = Arc::new(Mutex::new(Vec::with_capacity(
        config.workers.saturating_mul(config.rounds),
    )));
    let latch = Arc::new(CompletionLatch::new(config.workers));
    let first_error: Arc<Mutex<Option<TurnstileError>>> = Arc::new(Mutex::new(None));

    for id in 0..config.workers {
        let turnstile = Arc::clone(&turnstile);
        let entries = Arc::clone(&entries);
        let latch = Arc::clone(&latch);
        let worker_stop = Arc::clone(stop);
        let first_error = Arc::clone(&first_error);
        let rounds = config.rounds;
        let turn_timeout = config.turn_timeout;

        let spawned = thread::Builder::new()
            .name(format!("turnstile-worker-{id}"))
            .spawn(move || {
                for _ in 0..rounds {
                    if worker_stop.load(Ordering::Acquire) {
                        break;
                    }
                    let pass = match turn_timeout {
                        Some(timeout) => turnstile.await_turn_for(id, timeout),
                        None => turnstile.await_turn(id),
                    };
                    match pass {
                        Ok(pass) => {
                            // Recorded under the pass so log order is entry
                            // order; the simulated unit of work happens
                            // after complete(), outside the lock.
                            entries.lock().push(Entry {
                                id,
                                turn: pass.turn(),
                            });
                            pass.complete();
                        }
                        Err(err) => {
                            let mut slot = first_error.lock();
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                            worker_stop.store(true, Ordering::Release);
                            break;
                        }
                    }
                }
                latch.count_down();
            });
        // The handle is dropped on success: workers are detached and
        // completion is observed through the latch.
        if let Err(err) = spawned {
            stop.store(true, Ordering::Release);
            return Err(TurnstileError::Spawn(err));
        }
    }

    let bound = config.completion_bound();
    let completed = latch.wait_for(bound);
    if let Some(err) = first_error.lock().take() {
        return Err(err);
    }
    if !completed {
        return Err(TurnstileError::Incomplete {
            outstanding: latch.outstanding(),
            waited: bound,
        });
    }

    let entries = std::mem::take(&mut *entries.lock());
    Ok(RunOutcome {
        final_turn_count: turnstile.turn_count(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(workers: usize, rounds: usize) -> WorkerConfig {
        WorkerConfig {
            workers,
            rounds,
            turn_timeout: Some(Duration::from_secs(5)),
        }
    }

    #[test]
    fn zero_workers_is_invalid() {
        let err = run_round_robin(&config(0, 1)).err().expect("must fail");
        assert!(matches!(err, TurnstileError::InvalidParticipantCount(0)));
    }

    #[test]
    fn three_workers_two_rounds_exact_log() {
        let outcome = run_round_robin(&config(3, 2)).unwrap();
        let expected: Vec<Entry> = [(0, 0), (1, 1), (2, 2), (0, 3), (1, 4), (2, 5)]
            .into_iter()
            .map(|(id, turn)| Entry { id, turn })
            .collect();
        assert_eq!(outcome.entries, expected);
        assert_eq!(outcome.final_turn_count, 6);
    }

    #[test]
    fn single_worker_runs_without_contention() {
        let outcome = run_round_robin(&config(1, 5)).unwrap();
        assert_eq!(outcome.entries.len(), 5);
        for (round, entry) in outcome.entries.iter().enumerate() {
            assert_eq!(entry.id, 0);
            assert_eq!(entry.turn, round as u64);
        }
        assert_eq!(outcome.final_turn_count, 5);
    }

    #[test]
    fn zero_rounds_completes_with_empty_log() {
        let outcome = run_round_robin(&config(4, 0)).unwrap();
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.final_turn_count, 0);
    }

    #[test]
    fn many_workers_terminate_and_keep_order() {
        let outcome = run_round_robin(&config(8, 10)).unwrap();
        assert_eq!(outcome.entries.len(), 80);
        for (i, entry) in outcome.entries.iter().enumerate() {
            assert_eq!(entry.turn, i as u64);
            assert_eq!(entry.id, i % 8);
        }
        assert_eq!(outcome.final_turn_count, 80);
    }

    #[test]
    fn raised_stop_flag_halts_workers_before_any_round() {
        let stop = Arc::new(AtomicBool::new(true));
        let outcome = run_round_robin_with_stop(&config(3, 4), &stop).unwrap();
        assert!(outcome.entries.is_empty());
        assert_eq!(outcome.final_turn_count, 0);
    }

    #[test]
    fn caller_keeps_the_stop_flag_across_runs() {
        // The driver only borrows the flag; the caller can inspect it after
        // a run and reuse the same flag for another.
        let stop = Arc::new(AtomicBool::new(false));

        let outcome = run_round_robin_with_stop(&config(3, 2), &stop).unwrap();
        let expected: Vec<Entry> = [(0, 0), (1, 1), (2, 2), (0, 3), (1, 4), (2, 5)]
            .into_iter()
            .map(|(id, turn)| Entry { id, turn })
            .collect();
        assert_eq!(outcome.entries, expected);
        assert_eq!(outcome.final_turn_count, 6);
        assert!(!stop.load(Ordering::Acquire));

        stop.store(true, Ordering::Release);
        let outcome = run_round_robin_with_stop(&config(3, 2), &stop).unwrap();
        assert!(outcome.entries.is_empty());
    }

    #[test]
    fn completion_bound_scales_with_turn_timeout() {
        let unbounded = WorkerConfig {
            workers: 3,
            rounds: 2,
            turn_timeout: None,
        };
        assert_eq!(unbounded.completion_bound(), Duration::from_secs(60));

        let bounded = config(3, 2);
        assert!(bounded.completion_bound() >= Duration::from_secs(5));
    }

    #[test]
    fn completion_bound_tolerates_absurd_sizes() {
        let absurd = WorkerConfig {
            workers: usize::MAX,
            rounds: usize::MAX,
            turn_timeout: Some(Duration::from_millis(1)),
        };
        // Must not overflow; the step count is clamped.
        assert!(absurd.completion_bound() >= Duration::from_secs(5));
    }
}
