//! Binary entrypoint: replay a batch of events, write alerts as JSON lines.
//!
//! Input is a JSON array or JSON lines of `{"type", "time", "Content"}` events,
//! from `--input` or stdin. Each notification that goes out becomes one
//! AlertSummary line on stdout. Logs go to stderr.

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rate_alert::audit::AuditTrail;
use rate_alert::clock::{Clock, FixedClock, SystemClock};
use rate_alert::{decode, Engine, EngineError, Settings};

#[derive(Debug, Parser)]
#[command(name = "rate-alert", about = "Replay log events through the rate alerting pipeline")]
struct Args {
  /// Event batch (JSON array or JSON lines). Reads stdin when omitted.
  #[arg(long)]
  input: Option<PathBuf>,

  /// Policies and topic roster (JSON). Built-in defaults when omitted.
  #[arg(long, env = "RATE_ALERT_SETTINGS")]
  settings: Option<PathBuf>,

  /// Evaluation instant in Unix seconds. Defaults to the wall clock.
  #[arg(long, env = "RATE_ALERT_NOW", allow_negative_numbers = true)]
  now: Option<i64>,

  /// Write every bus signal as JSON lines to this file.
  #[arg(long)]
  audit: Option<PathBuf>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();
  match run(args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("rate-alert: {}", e);
      ExitCode::FAILURE
    }
  }
}

fn run(args: Args) -> Result<(), EngineError> {
  let settings = match &args.settings {
    Some(path) => Settings::load(path)?,
    None => Settings::stub(),
  };

  let raw = match &args.input {
    Some(path) => fs::read_to_string(path)?,
    None => {
      let mut buf = String::new();
      io::stdin().lock().read_to_string(&mut buf)?;
      buf
    }
  };
  let events = decode::decode(&raw)?;

  let clock: Box<dyn Clock> = match args.now {
    Some(t) => Box::new(FixedClock(t)),
    None => Box::new(SystemClock),
  };

  let mut engine = Engine::from_settings(&settings);
  let audit = Arc::new(AuditTrail::new());
  if args.audit.is_some() {
    engine.bus().subscribe(audit.clone());
  }

  let report = engine.run_with_clock(&events, clock.as_ref());
  info!(
    processed = report.process.processed,
    crossings = report.process.crossings.len(),
    alerts = report.alerts.len(),
    failures = report.process.failures.len(),
    "batch complete"
  );

  let stdout = io::stdout();
  let mut out = BufWriter::new(stdout.lock());
  for alert in &report.alerts {
    serde_json::to_writer(&mut out, alert)?;
    writeln!(out)?;
  }
  out.flush()?;

  if let Some(path) = &args.audit {
    let mut file = BufWriter::new(fs::File::create(path)?);
    for entry in audit.entries() {
      serde_json::to_writer(&mut file, &entry)?;
      writeln!(file)?;
    }
    file.flush()?;
  }

  Ok(())
}
