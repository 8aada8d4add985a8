//! Score a patient record and print risks with recommendations.
//!
//! Usage: `risk-report [--artifacts DIR] [RECORD.json]`
//!
//! Reads the record from stdin when no file is given. Without `--artifacts`
//! the artifact base directory comes from `CHRONIC_RISK_HOME` (default `.`).

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chronic_risk_advice::RiskReport;
use chronic_risk_core::{PatientRecord, RiskScorer, ScorerConfig};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "risk-report",
    version,
    about = "Score a patient record and print risks with recommendations"
)]
struct Args {
    /// Artifact base directory (defaults to CHRONIC_RISK_HOME, then `.`)
    #[arg(long)]
    artifacts: Option<PathBuf>,

    /// JSON record file; read from stdin when omitted
    input: Option<PathBuf>,
}

fn read_record(input: Option<&PathBuf>) -> Result<PatientRecord> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read record from stdin")?;
            buffer
        }
    };
    PatientRecord::from_json(&text).context("record must be a JSON object of attributes")
}

fn run() -> Result<()> {
    let args = Args::parse();
    let config = match args.artifacts {
        Some(dir) => ScorerConfig::with_base_dir(dir),
        None => ScorerConfig::from_env(),
    };

    let record = read_record(args.input.as_ref())?;
    let scorer = RiskScorer::new(config);
    let report = RiskReport::generate(&scorer, &record).context("risk scoring failed")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::debug!("{:?}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
