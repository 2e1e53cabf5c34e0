//! Run reports: execution, verification, and rendering.
//!
//! A [`RunReport`] is the harness's durable artifact: the run configuration,
//! the full `(id, turn)` entry log, and the verification findings. Reports
//! round-trip through JSON so a `run` can be re-checked later by `check`.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use turnstile_core::contract::{turn_owner, valid_participant_count};
use turnstile_core::error::TurnstileError;
use turnstile_core::worker::{Entry, WorkerConfig, run_round_robin};

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Run(#[from] TurnstileError),
}

/// One critical-section entry as serialized in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: usize,
    pub turn: u64,
}

impl From<Entry> for EntryRecord {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            turn: entry.turn,
        }
    }
}

/// Overall verdict of a run's verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Pass,
    Fail,
}

/// Durable record of one demonstration run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub workers: usize,
    pub rounds: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_timeout_ms: Option<u64>,
    pub entries: Vec<EntryRecord>,
    pub final_turn_count: u64,
    pub findings: Vec<String>,
    pub status: RunStatus,
}

impl RunReport {
    /// Load a previously written JSON report.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Serialize as pretty JSON.
    pub fn to_json(&self) -> Result<String, HarnessError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON form to `path`.
    pub fn write_json(&self, path: &Path) -> Result<(), HarnessError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Re-run verification against the embedded entry log, refreshing
    /// `findings` and `status`.
    pub fn reverify(&mut self) {
        let mut findings = verify_entries(&self.entries, self.workers, self.rounds);
        let expected_final = self.workers.saturating_mul(self.rounds) as u64;
        if self.final_turn_count != expected_final {
            findings.push(format!(
                "final turn count {} != expected {expected_final}",
                self.final_turn_count
            ));
        }
        self.status = if findings.is_empty() {
            RunStatus::Pass
        } else {
            RunStatus::Fail
        };
        self.findings = findings;
    }

    /// Human-readable rendering.
    #[must_use]
    pub fn render_plain(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "turnstile run: {} workers x {} rounds\n",
            self.workers, self.rounds
        ));
        for entry in &self.entries {
            out.push_str(&format!("  worker {:>3}  turn {:>6}\n", entry.id, entry.turn));
        }
        out.push_str(&format!("final turn count: {}\n", self.final_turn_count));
        for finding in &self.findings {
            out.push_str(&format!("FINDING: {finding}\n"));
        }
        out.push_str(match self.status {
            RunStatus::Pass => "status: pass\n",
            RunStatus::Fail => "status: fail\n",
        });
        out
    }
}

/// Check an entry log against the round-robin ordering properties.
///
/// Returns one finding per violation; an empty vector means the log is
/// exactly the expected `(0,0),(1,1),...` rotation.
#[must_use]
pub fn verify_entries(entries: &[EntryRecord], workers: usize, rounds: usize) -> Vec<String> {
    let mut findings = Vec::new();
    if !valid_participant_count(workers) {
        findings.push("participant count is zero".to_string());
        return findings;
    }

    let expected = workers.saturating_mul(rounds);
    if entries.len() != expected {
        findings.push(format!(
            "entry count {} != workers*rounds = {expected}",
            entries.len()
        ));
    }

    for (i, entry) in entries.iter().enumerate() {
        // One shared counter advanced once per pass: turns are dense and
        // strictly increasing from zero.
        if entry.turn != i as u64 {
            findings.push(format!(
                "entry {i}: turn {} breaks the dense strictly-increasing sequence",
                entry.turn
            ));
        }
        let owner = turn_owner(entry.turn, workers);
        if entry.id != owner {
            findings.push(format!(
                "entry {i}: worker {} entered on turn {} owned by worker {owner}",
                entry.id, entry.turn
            ));
        }
    }
    findings
}

/// Execute one demonstration run and verify its entry log.
pub fn run_report(
    workers: usize,
    rounds: usize,
    turn_timeout: Option<Duration>,
) -> Result<RunReport, HarnessError> {
    let outcome = run_round_robin(&WorkerConfig {
        workers,
        rounds,
        turn_timeout,
    })?;

    let mut report = RunReport {
        workers,
        rounds,
        turn_timeout_ms: turn_timeout.map(|t| t.as_millis() as u64),
        entries: outcome.entries.into_iter().map(EntryRecord::from).collect(),
        final_turn_count: outcome.final_turn_count,
        findings: Vec::new(),
        status: RunStatus::Pass,
    };
    report.reverify();
    Ok(report)
}
