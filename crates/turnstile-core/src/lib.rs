//! # turnstile-core
//!
//! A round-robin turnstile: N workers take strictly ordered turns over a
//! shared resource, enforced with nothing more than a mutual-exclusion lock
//! and a condition variable.
//!
//! Worker `id` may enter the critical section only when
//! `turn_count % participants == id`; completing a pass increments the
//! counter and broadcasts to all waiters, each of which re-checks the
//! predicate before proceeding. No `unsafe` code is permitted at the crate
//! level.

#![deny(unsafe_code)]

pub mod contract;
pub mod error;
pub mod latch;
pub mod turnstile;
pub mod worker;
