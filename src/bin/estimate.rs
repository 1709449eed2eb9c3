//! Line-oriented rent estimator.
//!
//! Loads the artifacts once, then reads one JSON property record per stdin
//! line and writes one JSON result per stdout line. Startup failures exit the
//! process; a bad request only fails its own line.

use anyhow::{Context, Result};
use clap::Parser;
use rent_inference::{Config, Error, PriceEstimator, PropertyAttributes};
use serde_json::json;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "estimate", about = "Estimate monthly rent from property records on stdin")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory that relative artifact paths are resolved against
    #[arg(short, long, env = "RENT_ARTIFACTS", default_value = ".")]
    artifacts: PathBuf,

    /// Fail at startup if the column list disagrees with the form
    #[arg(long)]
    strict_schema: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_json(path)?,
        None => Config::default(),
    };
    config.strict_schema |= cli.strict_schema;
    let config = config.with_artifact_dir(&cli.artifacts);

    let estimator = PriceEstimator::load(&config).context("failed to load artifacts")?;
    info!("Reading property records from stdin");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();
    for (n, line) in stdin.lock().lines().enumerate() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }

        let response = respond(&estimator, n + 1, &line);
        writeln!(stdout, "{response}")?;
        stdout.flush()?;
    }

    Ok(())
}

/// Result line for one request; failures become `{"error": ...}`.
fn respond(estimator: &PriceEstimator, line_no: usize, line: &str) -> serde_json::Value {
    match handle(estimator, line) {
        Ok(price) => json!({ "price": price }),
        Err(e) => {
            if e.is_fatal() {
                error!(line = line_no, error = %e, "Request hit a configuration error");
            } else {
                warn!(line = line_no, error = %e, "Request failed");
            }
            json!({ "error": e.user_message() })
        }
    }
}

fn handle(estimator: &PriceEstimator, line: &str) -> Result<u64, Error> {
    let attrs: PropertyAttributes = serde_json::from_str(line)
        .map_err(|e| Error::InvalidInput(format!("unreadable property record: {e}")))?;
    Ok(estimator.estimate(&attrs)?.price)
}
