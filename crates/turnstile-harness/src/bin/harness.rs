//! CLI entrypoint for the turnstile demonstration harness.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use turnstile_harness::report::{RunReport, RunStatus, run_report};
use turnstile_harness::structured_log::{LogEmitter, LogEntry, LogLevel};

/// Round-robin turnstile demonstration and verification tooling.
#[derive(Debug, Parser)]
#[command(name = "turnstile-harness")]
#[command(about = "Round-robin turnstile demonstration harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run N workers through R strictly ordered passes and report the log.
    Run {
        /// Number of workers (participants).
        #[arg(long, default_value_t = 3)]
        workers: usize,
        /// Passes each worker must complete.
        #[arg(long, default_value_t = 2)]
        rounds: usize,
        /// Per-turn wait bound in milliseconds (waits indefinitely if omitted).
        #[arg(long)]
        turn_timeout_ms: Option<u64>,
        /// Output format: `json` or `plain`.
        #[arg(long, default_value = "json")]
        format: String,
        /// Report file path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Optional JSONL structured-log path (`-` for stdout).
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Re-verify a previously written JSON run report.
    Check {
        /// Report JSON path produced by `run --format json --output ...`.
        #[arg(long)]
        input: PathBuf,
    },
}

fn emit_run_log(emitter: &mut LogEmitter, report: &RunReport) -> std::io::Result<()> {
    emitter.emit(
        &LogEntry::new(LogLevel::Info, "run_started")
            .with_detail(format!("{} workers x {} rounds", report.workers, report.rounds)),
    )?;
    for entry in &report.entries {
        emitter.emit(
            &LogEntry::new(LogLevel::Debug, "pass")
                .with_worker(entry.id)
                .with_turn(entry.turn),
        )?;
    }
    let level = match report.status {
        RunStatus::Pass => LogLevel::Info,
        RunStatus::Fail => LogLevel::Error,
    };
    emitter.emit(&LogEntry::new(level, "run_finished").with_turn(report.final_turn_count))?;
    emitter.flush()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            workers,
            rounds,
            turn_timeout_ms,
            format,
            output,
            log,
        } => {
            let turn_timeout = turn_timeout_ms.map(Duration::from_millis);
            let report = run_report(workers, rounds, turn_timeout)?;

            if let Some(log_path) = log {
                let mut emitter = if log_path.as_os_str() == "-" {
                    LogEmitter::stdout()
                } else {
                    LogEmitter::to_file(&log_path)?
                };
                emit_run_log(&mut emitter, &report)?;
            }

            match (output, format.as_str()) {
                (Some(path), "json") => report.write_json(&path)?,
                (Some(path), "plain") => std::fs::write(&path, report.render_plain())?,
                (None, "json") => println!("{}", report.to_json()?),
                (None, "plain") => println!("{}", report.render_plain()),
                (_, other) => return Err(format!("unknown format `{other}`").into()),
            }

            if report.status == RunStatus::Fail {
                return Err(format!(
                    "run verification failed: {}",
                    report.findings.join("; ")
                )
                .into());
            }
        }
        Command::Check { input } => {
            let mut report = RunReport::from_file(&input)?;
            report.reverify();
            for finding in &report.findings {
                eprintln!("FINDING: {finding}");
            }
            match report.status {
                RunStatus::Pass => {
                    eprintln!(
                        "{}: {} entries verified",
                        input.display(),
                        report.entries.len()
                    );
                }
                RunStatus::Fail => {
                    return Err(format!(
                        "{}: {} findings",
                        input.display(),
                        report.findings.len()
                    )
                    .into());
                }
            }
        }
    }

    Ok(())
}
