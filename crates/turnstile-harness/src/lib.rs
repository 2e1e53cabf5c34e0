//! # turnstile-harness
//!
//! Demonstration and verification harness for the round-robin turnstile:
//! runs N detached workers through R passes each, re-verifies the observed
//! entry log against the round-robin ordering properties, and renders the
//! result as JSON or plain text with optional JSONL structured logging.

pub mod report;
pub mod structured_log;

pub use report::{EntryRecord, HarnessError, RunReport, RunStatus, run_report, verify_entries};
