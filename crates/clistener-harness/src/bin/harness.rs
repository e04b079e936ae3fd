//! CLI entrypoint for the C listener stdio harness.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use clistener_core::config::ConversionMode;
use clistener_core::stdio;
use clistener_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, StreamKind, now_utc,
    validate_log_file,
};
use clistener_harness::{
    ConformanceReport, FixtureSet, HarnessError, TestRunner, VerificationSummary, cli_args, runner,
};

/// printf/scanf tooling for the C listener.
#[derive(Debug, Parser)]
#[command(name = "clistener-harness")]
#[command(about = "Run and verify the C listener stdio shim")]
struct Cli {
    /// Write JSONL structured log entries to this file.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a template through printf.
    Printf {
        template: String,
        /// Typed arguments: i:42 u:7 f:1.5 c:x s:text p:0x10 (bare text is a string).
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Read standard input with a scanf format and print the outcome as JSON.
    Scanf { format: String },
    /// Verify the shim against fixture files.
    Verify {
        /// Fixture JSON file or directory.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON and artifact index written alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Conversion mode to verify (`strict` or `coerce`); both when omitted.
        #[arg(long)]
        mode: Option<String>,
    },
    /// Validate a structured log file.
    ValidateLog {
        /// JSONL file to check.
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), HarnessError> {
    let run_id = format!("run-{}", std::process::id());
    let mut log = match &cli.log {
        Some(path) => LogEmitter::to_file(path, "harness", &run_id)?,
        None => LogEmitter::to_sink("harness", &run_id),
    };

    let result = match cli.command {
        Command::Printf { template, args } => printf(&template, &args, &mut log),
        Command::Scanf { format } => scanf(&format, &mut log),
        Command::Verify {
            fixture,
            report,
            mode,
        } => verify(&fixture, report.as_deref(), mode.as_deref(), &mut log),
        Command::ValidateLog { path } => validate(&path),
    };

    let exit_code = i32::from(result.is_err());
    log.emit_entry(
        LogEntry::new("", LogLevel::Info, "harness_exit")
            .with_stream(StreamKind::Cli)
            .with_exit_code(exit_code),
    )?;
    log.flush()?;
    result
}

fn printf(template: &str, raw_args: &[String], log: &mut LogEmitter) -> Result<(), HarnessError> {
    let args = raw_args
        .iter()
        .map(|a| cli_args::parse_arg(a))
        .collect::<Result<Vec<_>, _>>()?;
    let started = Instant::now();
    let result = stdio::printf(template, &args);
    log.emit_entry(
        cli_entry("printf", started, result.is_ok()).with_details(serde_json::json!({
            "template": template,
            "argc": args.len(),
        })),
    )?;
    Ok(result?)
}

fn scanf(format: &str, log: &mut LogEmitter) -> Result<(), HarnessError> {
    let started = Instant::now();
    let stdin = std::io::stdin();
    let result = stdio::scan_values(&mut stdin.lock(), format);
    log.emit_entry(
        cli_entry("scanf", started, result.is_ok())
            .with_details(serde_json::json!({ "format": format })),
    )?;
    let outcome = result?;
    println!("{}", serde_json::to_string_pretty(&runner::outcome_json(&outcome))?);
    Ok(())
}

fn cli_entry(symbol: &str, started: Instant, ok: bool) -> LogEntry {
    let latency_ns = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
    let (level, outcome) = if ok {
        (LogLevel::Info, Outcome::Pass)
    } else {
        (LogLevel::Error, Outcome::Error)
    };
    LogEntry::new("", level, "stdio_call")
        .with_stream(StreamKind::Cli)
        .with_symbol(symbol)
        .with_outcome(outcome)
        .with_latency_ns(latency_ns)
}

fn verify(
    fixture: &Path,
    report: Option<&Path>,
    mode: Option<&str>,
    log: &mut LogEmitter,
) -> Result<(), HarnessError> {
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let fixture_sets = FixtureSet::load_all(fixture)?;
    let modes = match mode {
        Some(m) => vec![ConversionMode::from_str_loose(m)],
        None => vec![ConversionMode::Strict, ConversionMode::Coerce],
    };

    let mut results = Vec::new();
    for &mode in &modes {
        let runner = TestRunner::new("fixture-verify", mode);
        for set in &fixture_sets {
            results.extend(runner.run_logged(set, log)?);
        }
    }

    let summary = VerificationSummary::from_results(results);
    let report_doc = ConformanceReport {
        title: String::from("C listener stdio conformance report"),
        mode: modes
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join("+"),
        timestamp: now_utc(),
        summary,
    };
    eprintln!(
        "Verification complete: total={}, passed={}, failed={}",
        report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
    );

    if let Some(report_path) = report {
        eprintln!("Writing report to {}", report_path.display());
        std::fs::write(report_path, report_doc.to_markdown())?;
        let json_path = report_path.with_extension("json");
        std::fs::write(&json_path, report_doc.to_json())?;

        let mut index = ArtifactIndex::new(format!("run-{}", std::process::id()));
        index
            .add_file(report_path, "report_markdown")?
            .add_file(&json_path, "report_json")?;
        let index_path = report_path.with_extension("artifacts.json");
        std::fs::write(&index_path, index.to_json()?)?;
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "report_written")
                .with_stream(StreamKind::Conformance)
                .with_artifacts(vec![
                    report_path.display().to_string(),
                    json_path.display().to_string(),
                    index_path.display().to_string(),
                ]),
        )?;
    }

    if !report_doc.summary.all_passed() {
        for failure in report_doc.summary.failures() {
            eprintln!("FAIL {} [{}]", failure.case_name, failure.mode);
            if let Some(diff) = &failure.diff {
                eprintln!("{diff}");
            }
        }
        return Err(HarnessError::VerificationFailed {
            failed: report_doc.summary.failed,
            total: report_doc.summary.total,
        });
    }
    Ok(())
}

fn validate(path: &Path) -> Result<(), HarnessError> {
    let (lines, errors) = validate_log_file(path)?;
    for error in &errors {
        eprintln!("{error}");
    }
    if !errors.is_empty() {
        return Err(HarnessError::InvalidLog {
            path: path.to_path_buf(),
            count: errors.len(),
        });
    }
    eprintln!("{}: {lines} valid entries", path.display());
    Ok(())
}
