//! Structured JSONL logging for harness runs.
//!
//! Provides:
//! - [`LogEntry`]: canonical JSONL log record for run events.
//! - [`LogEmitter`]: writes JSONL lines to a file or stdout.
//! - [`validate_log_line`]: validates a single JSONL line against the schema.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Log entry
// ---------------------------------------------------------------------------

/// Severity level for log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Canonical structured log entry.
///
/// Required fields: `timestamp_ms`, `level`, `event`. Optional fields carry
/// per-worker and per-turn context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LogEntry {
    /// New entry stamped with the current wall clock.
    #[must_use]
    pub fn new(level: LogLevel, event: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            timestamp_ms,
            level,
            event: event.into(),
            worker: None,
            turn: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_worker(mut self, worker: usize) -> Self {
        self.worker = Some(worker);
        self
    }

    #[must_use]
    pub fn with_turn(mut self, turn: u64) -> Self {
        self.turn = Some(turn);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Serialize as one JSONL line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Parse and schema-check a single JSONL line.
pub fn validate_log_line(line: &str) -> Result<LogEntry, serde_json::Error> {
    serde_json::from_str(line)
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

enum LogSink {
    Stdout,
    File(BufWriter<File>),
}

/// Writes JSONL log lines to a file or stdout.
pub struct LogEmitter {
    sink: LogSink,
}

impl LogEmitter {
    /// Emitter that writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self {
            sink: LogSink::Stdout,
        }
    }

    /// Emitter that appends to the file at `path`, creating it if needed.
    pub fn to_file(path: &Path) -> std::io::Result<Self> {
        let file = File::options().create(true).append(true).open(path)?;
        Ok(Self {
            sink: LogSink::File(BufWriter::new(file)),
        })
    }

    /// Write one entry as a JSONL line.
    pub fn emit(&mut self, entry: &LogEntry) -> std::io::Result<()> {
        let line = entry.to_json_line().map_err(std::io::Error::other)?;
        match &mut self.sink {
            LogSink::Stdout => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{line}")
            }
            LogSink::File(writer) => writeln!(writer, "{line}"),
        }
    }

    /// Flush buffered lines.
    pub fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.sink {
            LogSink::Stdout => std::io::stdout().lock().flush(),
            LogSink::File(writer) => writer.flush(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_serializes_required_fields_only_by_default() {
        let entry = LogEntry::new(LogLevel::Info, "run_started");
        let line = entry.to_json_line().unwrap();
        assert!(line.contains("\"event\":\"run_started\""));
        assert!(line.contains("\"level\":\"info\""));
        assert!(!line.contains("worker"));
        assert!(!line.contains("detail"));
    }

    #[test]
    fn optional_context_appears_when_set() {
        let entry = LogEntry::new(LogLevel::Debug, "pass")
            .with_worker(2)
            .with_turn(7);
        let line = entry.to_json_line().unwrap();
        assert!(line.contains("\"worker\":2"));
        assert!(line.contains("\"turn\":7"));
    }

    #[test]
    fn validate_round_trips_an_emitted_line() {
        let entry = LogEntry::new(LogLevel::Warn, "run_failed").with_detail("timeout");
        let line = entry.to_json_line().unwrap();
        let parsed = validate_log_line(&line).unwrap();
        assert_eq!(parsed.level, LogLevel::Warn);
        assert_eq!(parsed.event, "run_failed");
        assert_eq!(parsed.detail.as_deref(), Some("timeout"));
    }

    #[test]
    fn validate_rejects_missing_required_fields() {
        assert!(validate_log_line("{\"level\":\"info\"}").is_err());
        assert!(validate_log_line("not json").is_err());
    }

    #[test]
    fn stdout_emitter_accepts_entries() {
        let mut emitter = LogEmitter::stdout();
        emitter
            .emit(&LogEntry::new(LogLevel::Info, "run_started"))
            .unwrap();
        emitter.flush().unwrap();
    }

    #[test]
    fn file_emitter_writes_one_line_per_entry() {
        let dir = std::env::temp_dir().join("turnstile-harness-log-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("log-{}.jsonl", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut emitter = LogEmitter::to_file(&path).unwrap();
        emitter
            .emit(&LogEntry::new(LogLevel::Info, "run_started"))
            .unwrap();
        emitter
            .emit(&LogEntry::new(LogLevel::Info, "run_finished").with_turn(6))
            .unwrap();
        emitter.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            validate_log_line(line).unwrap();
        }
        std::fs::remove_file(&path).unwrap();
    }
}
