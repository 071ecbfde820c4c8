//! Thin CLI adapter around `cuboid_lift_core`: reads a JSON payload, calls the
//! core, and prints the JSON report. No business logic lives here; a
//! [`cuboid_lift_core::LiftError`] is rendered to stderr and maps to exit
//! status 1, everything else (I/O, malformed JSON) is an ordinary `anyhow`
//! error.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cuboid_lift_core::{lift_sequence, lift_single, LiftError};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Auto,
    Single,
    Batch,
}

/// Lift 2D camera detections to 3D cuboid pose (2.5D assumptions).
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to payload JSON. single: camera+detection+object; batch: camera+object+frames.
    /// Omit (or pass "-") to read the payload from stdin.
    #[arg(long)]
    input_json: Option<PathBuf>,

    /// auto: detect by payload.frames; single: one detection; batch: sequence.
    #[arg(long, value_enum, default_value_t = Mode::Auto)]
    mode: Mode,

    /// Pretty-print output JSON.
    #[arg(long)]
    pretty: bool,
}

fn read_payload(args: &Args) -> Result<Value> {
    let raw = match &args.input_json {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading payload from stdin")?;
            buf
        }
    };
    let payload: Value = serde_json::from_str(&raw).context("parsing input JSON")?;
    if !payload.is_object() {
        anyhow::bail!("input JSON must be an object");
    }
    Ok(payload)
}

fn resolve_mode(mode: Mode, payload: &Value) -> Mode {
    match mode {
        Mode::Auto => match payload.get("frames") {
            Some(Value::Array(_)) => Mode::Batch,
            _ => Mode::Single,
        },
        other => other,
    }
}

/// Wraps [`LiftError`] so it can travel through `anyhow::Result` while still
/// being recoverable by `main` for the one-line `error: <kind>: <message>`
/// rendering; any other failure (I/O, malformed JSON) falls through to
/// `anyhow`'s default chained report instead.
#[derive(Debug)]
struct CliLiftError(LiftError);

impl std::fmt::Display for CliLiftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for CliLiftError {}

fn run(args: &Args) -> Result<Value> {
    let payload = read_payload(args)?;
    let null = Value::Null;
    let get = |key: &str| payload.get(key).unwrap_or(&null);

    let output = match resolve_mode(args.mode, &payload) {
        Mode::Batch => {
            let report = lift_sequence(get("camera"), get("object"), get("config"), get("frames")).map_err(CliLiftError)?;
            serde_json::to_value(report)?
        }
        Mode::Single | Mode::Auto => {
            let report = lift_single(get("camera"), get("detection"), get("object"), get("config")).map_err(CliLiftError)?;
            serde_json::to_value(report)?
        }
    };

    Ok(output)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(output) => {
            let rendered = if args.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }
            .expect("report is always serializable");
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            match err.downcast::<CliLiftError>() {
                Ok(CliLiftError(lift_err)) => eprintln!("error: {}: {}", lift_err.kind(), lift_err),
                Err(other) => eprintln!("error: {other:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
